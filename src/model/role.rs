#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Master = 1,
    Admin = 2,
    Worker = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Master),
            2 => Some(Role::Admin),
            3 => Some(Role::Worker),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_round_trips() {
        for role in [Role::Master, Role::Admin, Role::Worker] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
    }

    #[test]
    fn from_id_rejects_unknown() {
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(4), None);
    }
}
