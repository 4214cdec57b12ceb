use serde::Serialize;

/// Character set the exported document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1, the repertoire of the classic PDF core fonts.
    Latin1,
}

impl ExportEncoding {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "utf8" => Some(Self::Utf8),
            "latin1" | "iso88591" => Some(Self::Latin1),
            _ => None,
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Utf8 => "text/plain; charset=utf-8",
            Self::Latin1 => "text/plain; charset=iso-8859-1",
        }
    }

    /// Encode already-rendered text. Characters outside the repertoire were
    /// rejected line by line during rendering, so none remain here.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 => text
                .chars()
                .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("character {0:?} cannot be encoded as ISO-8859-1")]
    Unrepresentable(char),
    #[error("control character {0:?} in line")]
    ControlCharacter(char),
}

/// Renders one laid-out line for the target document format.
pub trait LineBackend {
    fn render_line(&self, line: &str) -> Result<String, LineError>;

    fn encoding(&self) -> ExportEncoding;
}

fn reject_controls(line: &str) -> Result<(), LineError> {
    match line.chars().find(|ch| ch.is_control()) {
        Some(ch) => Err(LineError::ControlCharacter(ch)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Backend;

impl LineBackend for Utf8Backend {
    fn render_line(&self, line: &str) -> Result<String, LineError> {
        reject_controls(line)?;
        Ok(line.to_string())
    }

    fn encoding(&self) -> ExportEncoding {
        ExportEncoding::Utf8
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1Backend;

impl LineBackend for Latin1Backend {
    fn render_line(&self, line: &str) -> Result<String, LineError> {
        reject_controls(line)?;
        match line.chars().find(|ch| u32::from(*ch) > 0xFF) {
            Some(ch) => Err(LineError::Unrepresentable(ch)),
            None => Ok(line.to_string()),
        }
    }

    fn encoding(&self) -> ExportEncoding {
        ExportEncoding::Latin1
    }
}
