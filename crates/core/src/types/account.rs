//! Account privilege levels.

/// The kind of account being created.
///
/// Privileges are stored as the `is_staff` / `is_superuser` flag pair; this
/// enum names the two combinations accounts are created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccountKind {
    /// A regular user with no elevated privileges.
    #[default]
    Regular,
    /// A user with both the staff and superuser flags set.
    Superuser,
}

impl AccountKind {
    /// Whether accounts of this kind carry the staff flag.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Superuser)
    }

    /// Whether accounts of this kind carry the superuser flag.
    #[must_use]
    pub const fn is_superuser(self) -> bool {
        matches!(self, Self::Superuser)
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Superuser => write!(f, "superuser"),
        }
    }
}
