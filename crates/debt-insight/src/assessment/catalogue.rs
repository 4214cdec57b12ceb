use super::domain::{Behavior, BehaviorId, HelpDirectory, Question, QuestionId};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One of the four static files making up a catalogue directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogueFile {
    Behaviors,
    Questions,
    Evaluation,
    Help,
}

impl CatalogueFile {
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Behaviors => "behaviors.json",
            Self::Questions => "questions.json",
            Self::Evaluation => "evaluation.json",
            Self::Help => "help.json",
        }
    }

    /// Name used by catalogues exported from the first Spanish-language deployment.
    pub const fn legacy_file_name(self) -> &'static str {
        match self {
            Self::Behaviors => "comportamientos.json",
            Self::Questions => "preguntas.json",
            Self::Evaluation => "evaluacion.json",
            Self::Help => "ayuda.json",
        }
    }

    fn resolve(self, dir: &Path) -> PathBuf {
        let primary = dir.join(self.file_name());
        if primary.is_file() {
            return primary;
        }
        let legacy = dir.join(self.legacy_file_name());
        if legacy.is_file() {
            return legacy;
        }
        primary
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("missing catalogue file {}", .path.display())]
    MissingFile { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{file} uses non-numeric id '{key}'")]
    InvalidId { file: &'static str, key: String },
    #[error("question {0} is listed more than once")]
    DuplicateQuestion(QuestionId),
    #[error("{file} lists id {id} under more than one key")]
    DuplicateKey { file: &'static str, id: u32 },
}

/// Immutable lookup tables shared by every session for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    questions: Vec<Question>,
    behaviors: HashMap<BehaviorId, Behavior>,
    evaluation: HashMap<QuestionId, Vec<BehaviorId>>,
    help: HelpDirectory,
}

impl Catalogue {
    /// Load all four catalogue files from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let dir = dir.as_ref();

        let raw_behaviors: BTreeMap<String, Behavior> = read_json(dir, CatalogueFile::Behaviors)?;
        let questions: Vec<Question> = read_json(dir, CatalogueFile::Questions)?;
        let raw_evaluation: BTreeMap<String, Vec<u32>> =
            read_json(dir, CatalogueFile::Evaluation)?;
        let help: HelpDirectory = read_json(dir, CatalogueFile::Help)?;

        let behaviors = raw_behaviors
            .into_iter()
            .map(|(key, behavior)| {
                parse_id(CatalogueFile::Behaviors, &key).map(|id| (BehaviorId(id), behavior))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let evaluation = raw_evaluation
            .into_iter()
            .map(|(key, ids)| {
                parse_id(CatalogueFile::Evaluation, &key)
                    .map(|id| (QuestionId(id), ids.into_iter().map(BehaviorId).collect::<Vec<_>>()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let catalogue = Self::from_parts(questions, behaviors, evaluation, help)?;
        info!(
            dir = %dir.display(),
            questions = catalogue.questions.len(),
            behaviors = catalogue.behaviors.len(),
            help_contacts = catalogue.help.len(),
            "catalogue loaded"
        );
        Ok(catalogue)
    }

    /// Assemble a catalogue from already-parsed parts.
    ///
    /// Behavior ids are taken from the map keys. Evaluation lists are
    /// de-duplicated keeping their first occurrence.
    pub fn from_parts(
        questions: Vec<Question>,
        behaviors: impl IntoIterator<Item = (BehaviorId, Behavior)>,
        evaluation: impl IntoIterator<Item = (QuestionId, Vec<BehaviorId>)>,
        help: HelpDirectory,
    ) -> Result<Self, CatalogueError> {
        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(CatalogueError::DuplicateQuestion(question.id));
            }
        }

        // Keys such as "1" and "01" parse to the same id.
        let mut behavior_table = HashMap::new();
        for (id, mut behavior) in behaviors {
            behavior.id = id;
            if behavior_table.insert(id, behavior).is_some() {
                return Err(CatalogueError::DuplicateKey {
                    file: CatalogueFile::Behaviors.file_name(),
                    id: id.0,
                });
            }
        }

        let mut evaluation_table = HashMap::new();
        for (question, ids) in evaluation {
            let mut unique = HashSet::new();
            let ids: Vec<BehaviorId> = ids.into_iter().filter(|id| unique.insert(*id)).collect();
            if evaluation_table.insert(question, ids).is_some() {
                return Err(CatalogueError::DuplicateKey {
                    file: CatalogueFile::Evaluation.file_name(),
                    id: question.0,
                });
            }
        }

        Ok(Self {
            questions,
            behaviors: behavior_table,
            evaluation: evaluation_table,
            help,
        })
    }

    /// Questions in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn behavior(&self, id: BehaviorId) -> Option<&Behavior> {
        self.behaviors.get(&id)
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Behaviors a "yes" to `question` can trigger; empty when the table has no entry.
    pub fn behaviors_for(&self, question: QuestionId) -> &[BehaviorId] {
        self.evaluation
            .get(&question)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn help(&self) -> &HelpDirectory {
        &self.help
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: CatalogueFile) -> Result<T, CatalogueError> {
    let path = file.resolve(dir);
    debug!(path = %path.display(), "reading catalogue file");
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(CatalogueError::MissingFile { path })
        }
        Err(source) => return Err(CatalogueError::Io { path, source }),
    };
    serde_json::from_str(&raw).map_err(|source| CatalogueError::Parse { path, source })
}

fn parse_id(file: CatalogueFile, key: &str) -> Result<u32, CatalogueError> {
    key.trim()
        .parse::<u32>()
        .map_err(|_| CatalogueError::InvalidId {
            file: file.file_name(),
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).expect("write catalogue file");
    }

    fn write_minimal(dir: &Path) {
        write(
            dir,
            "behaviors.json",
            r#"{"10":{"title":"Impulse buying","description":"d","symptoms":"s","solution":"x"}}"#,
        );
        write(
            dir,
            "questions.json",
            r#"[{"id":1,"text":"Q1"},{"id":2,"text":"Q2"}]"#,
        );
        write(dir, "evaluation.json", r#"{"1":[10,10,99]}"#);
        write(
            dir,
            "help.json",
            r#"{"emergency":[{"name":"Line","phone":"800","url":"https://line.example"}]}"#,
        );
    }

    #[test]
    fn load_reads_all_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_minimal(dir.path());

        let catalogue = Catalogue::load(dir.path()).expect("catalogue loads");
        assert_eq!(catalogue.questions().len(), 2);
        assert_eq!(
            catalogue.behavior(BehaviorId(10)).map(|b| b.id),
            Some(BehaviorId(10))
        );
        assert_eq!(
            catalogue.behaviors_for(QuestionId(1)),
            &[BehaviorId(10), BehaviorId(99)]
        );
        assert!(catalogue.behaviors_for(QuestionId(2)).is_empty());
        assert_eq!(catalogue.help().emergency.len(), 1);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_minimal(dir.path());
        fs::remove_file(dir.path().join("evaluation.json")).expect("remove");

        match Catalogue::load(dir.path()) {
            Err(CatalogueError::MissingFile { path }) => {
                assert!(path.ends_with("evaluation.json"));
            }
            other => panic!("expected missing file error, got {other:?}"),
        }
    }

    #[test]
    fn legacy_file_names_are_accepted() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(
            dir.path(),
            "comportamientos.json",
            r#"{"5":{"titulo":"Crisis","descripcion":"d","sintomas":"s","solucion":"x"}}"#,
        );
        write(dir.path(), "preguntas.json", r#"[{"id":1,"texto":"Pregunta"}]"#);
        write(dir.path(), "evaluacion.json", r#"{"1":[5]}"#);
        write(
            dir.path(),
            "ayuda.json",
            r#"{"emergencia":[{"nombre":"Linea","telefono":"911","web":"https://x"}],"financiero":[],"terapia":[]}"#,
        );

        let catalogue = Catalogue::load(dir.path()).expect("legacy catalogue loads");
        assert_eq!(catalogue.questions()[0].text, "Pregunta");
        assert_eq!(
            catalogue.behavior(BehaviorId(5)).map(|b| b.title.as_str()),
            Some("Crisis")
        );
        assert_eq!(catalogue.help().emergency[0].phone.as_deref(), Some("911"));
    }

    #[test]
    fn non_numeric_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_minimal(dir.path());
        write(dir.path(), "evaluation.json", r#"{"one":[10]}"#);

        match Catalogue::load(dir.path()) {
            Err(CatalogueError::InvalidId { file, key }) => {
                assert_eq!(file, "evaluation.json");
                assert_eq!(key, "one");
            }
            other => panic!("expected invalid id, got {other:?}"),
        }
    }

    #[test]
    fn keys_naming_the_same_id_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_minimal(dir.path());
        write(dir.path(), "evaluation.json", r#"{"1":[10]," 1":[10],"01":[99]}"#);

        match Catalogue::load(dir.path()) {
            Err(CatalogueError::DuplicateKey { file, id }) => {
                assert_eq!(file, "evaluation.json");
                assert_eq!(id, 1);
            }
            other => panic!("expected duplicate key, got {other:?}"),
        }

        write_minimal(dir.path());
        write(
            dir.path(),
            "behaviors.json",
            r#"{"10":{"title":"a","description":"d","symptoms":"s","solution":"x"},"010":{"title":"b","description":"d","symptoms":"s","solution":"x"}}"#,
        );
        assert!(matches!(
            Catalogue::load(dir.path()),
            Err(CatalogueError::DuplicateKey {
                file: "behaviors.json",
                id: 10
            })
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_minimal(dir.path());
        write(dir.path(), "questions.json", "[{");

        assert!(matches!(
            Catalogue::load(dir.path()),
            Err(CatalogueError::Parse { .. })
        ));
    }

    #[test]
    fn duplicate_questions_are_rejected() {
        let questions = vec![
            Question {
                id: QuestionId(1),
                text: "a".to_string(),
            },
            Question {
                id: QuestionId(1),
                text: "b".to_string(),
            },
        ];
        let result = Catalogue::from_parts(
            questions,
            Vec::<(BehaviorId, Behavior)>::new(),
            Vec::<(QuestionId, Vec<BehaviorId>)>::new(),
            HelpDirectory::default(),
        );
        assert!(matches!(
            result,
            Err(CatalogueError::DuplicateQuestion(QuestionId(1)))
        ));
    }
}
