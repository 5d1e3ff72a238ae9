/// Account roles of the admin console, by their numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
    Admin,
    HrManager,
    HrSpecialist,
    Reviewer,
    Staff,
}

const ROLE_LABELS: [(Role, &str); 6] = [
    (Role::SuperAdmin, "Super Administrator"),
    (Role::Admin, "Administrator"),
    (Role::HrManager, "HR Manager"),
    (Role::HrSpecialist, "HR Specialist"),
    (Role::Reviewer, "Reviewer"),
    (Role::Staff, "Staff"),
];

impl Role {
    pub fn from_code(code: u8) -> Option<Self> {
        ROLE_LABELS.get(code as usize).map(|(role, _)| *role)
    }

    pub fn code(&self) -> u8 {
        ROLE_LABELS
            .iter()
            .position(|(role, _)| role == self)
            .unwrap_or(0) as u8
    }

    pub fn label(&self) -> &'static str {
        ROLE_LABELS[self.code() as usize].1
    }
}

/// Who is logged in, as far as the status bar is concerned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub name: Option<String>,
    pub role: Option<Role>,
}

impl Session {
    /// Unknown role codes are kept out rather than rejected
    pub fn new(name: Option<String>, role_code: Option<u8>) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
            role: role_code.and_then(Role::from_code),
        }
    }

    pub fn display(&self) -> String {
        match (&self.name, self.role) {
            (Some(name), Some(role)) => format!("{} {}", name, role.label()),
            (Some(name), None) => name.clone(),
            (None, _) => "Not logged in".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes() {
        for code in 0..6u8 {
            let role = Role::from_code(code).unwrap();
            assert_eq!(role.code(), code);
        }
        assert_eq!(Role::from_code(6), None);
        assert_eq!(Role::from_code(2).unwrap().label(), "HR Manager");
    }

    #[test]
    fn test_display() {
        let s = Session::new(Some("Li Wei".to_string()), Some(1));
        assert_eq!(s.display(), "Li Wei Administrator");

        let s = Session::new(Some("Li Wei".to_string()), Some(9));
        assert_eq!(s.display(), "Li Wei");

        assert_eq!(Session::new(None, Some(0)).display(), "Not logged in");
        assert_eq!(Session::new(Some("  ".to_string()), Some(0)).display(), "Not logged in");
    }
}
