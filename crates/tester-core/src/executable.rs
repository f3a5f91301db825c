//! Handle to the server under test.
//!
//! The process itself is started and stopped by the caller; stages only
//! need to know where to connect.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    addr: String,
}

impl Executable {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}
