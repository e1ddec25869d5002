use serde::{Deserialize, Serialize};

/// Lot selection order for disposals, fixed at engine construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// First in, first out - earliest acquisition consumed first (IRS default)
    #[default]
    Fifo,
    /// Last in, first out - latest acquisition consumed first
    Lifo,
    /// Highest in, first out - highest cost basis per unit consumed first
    Hifo,
}

impl Method {
    pub fn display(&self) -> &'static str {
        match self {
            Method::Fifo => "FIFO",
            Method::Lifo => "LIFO",
            Method::Hifo => "HIFO",
        }
    }

    pub const ALL: [Method; 3] = [Method::Fifo, Method::Lifo, Method::Hifo];
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
