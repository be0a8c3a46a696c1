use std::collections::HashSet;

/// Structured form of a single ICE candidate attribute line:
/// `candidate <foundation> <component> <transport> <priority> <address>
/// <port> typ <type> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateInfo {
    pub address: String,
    pub port: u16,
    pub typ: String,
}

impl CandidateInfo {
    /// Parse one candidate line. Returns `None` for anything malformed:
    /// a first field that is not the literal `candidate`, a missing `typ`
    /// token, or missing address/port fields. Never panics.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        // some stacks emit "candidate:<foundation> ..." as one token
        let normalized = match line.strip_prefix("candidate:") {
            Some(rest) => format!("candidate {rest}"),
            None => line.to_string(),
        };
        let parts: Vec<&str> = normalized.split_whitespace().collect();
        if parts.first() != Some(&"candidate") {
            return None;
        }
        let typ_index = parts.iter().position(|p| *p == "typ")?;
        let typ = parts.get(typ_index + 1)?;
        let address = parts.get(4)?;
        let port = parts.get(5)?.parse().ok()?;
        Some(Self {
            address: address.to_string(),
            port,
            typ: typ.to_string(),
        })
    }

    /// Dedup key over `(type, address, port)`.
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.typ, self.address, self.port)
    }
}

/// Tracks which candidate triples have already been reported for one peer
/// session. This only keeps repeats out of the logs; protocol correctness
/// never depends on it.
#[derive(Debug, Default)]
pub struct CandidateSeen {
    keys: HashSet<String>,
}

impl CandidateSeen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a `(type, address, port)` triple shows
    /// up; repeats return false and should be suppressed silently.
    pub fn insert(&mut self, info: &CandidateInfo) -> bool {
        self.keys.insert(info.key())
    }
}
