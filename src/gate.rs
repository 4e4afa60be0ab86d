/// Duplicate-suppression gate between the decoder and the user.
///
/// Idle until the first code arrives, then holds the last notified value.
/// A repeat of the held value is swallowed; any other value is notified
/// and replaces it. Only `dismiss` returns the gate to idle.
#[derive(Debug, Clone, Default)]
pub struct ResultGate {
    held: Option<String>,
}

impl ResultGate {
    /// New idle gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a decoded value. Returns `true` if the user should be notified.
    pub fn offer(&mut self, code: &str) -> bool {
        if self.held.as_deref() == Some(code) {
            return false;
        }
        self.held = Some(code.to_owned());
        true
    }

    /// Value currently shown, if any
    pub fn current(&self) -> Option<&str> {
        self.held.as_deref()
    }

    /// Whether a result is being held
    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Clear the held value so the same code can be detected again
    pub fn dismiss(&mut self) {
        self.held = None;
    }
}
