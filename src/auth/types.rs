/// Selects which stored token digest a candidate token is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Remember,
    Activation,
}

impl DigestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestKind::Remember => "remember",
            DigestKind::Activation => "activation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DigestKind;

    #[test]
    fn digest_kind_names() {
        assert_eq!(DigestKind::Remember.as_str(), "remember");
        assert_eq!(DigestKind::Activation.as_str(), "activation");
    }
}
