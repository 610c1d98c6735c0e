use tracing::{debug, instrument};

use crate::biz::{User, UserRepo};
use crate::error::UserError;

/// 进程内存储，重启即丢失
#[derive(Debug, Clone)]
pub struct UserRepoImpl {
    users: Vec<User>,
    next_id: u64,
}

impl UserRepoImpl {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            next_id: 1,
        }
    }
}

impl Default for UserRepoImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepo for UserRepoImpl {
    #[instrument(skip(self))]
    fn add(&mut self, name: &str, email: &str, age: u8) -> User {
        let id = self.next_id;
        self.next_id += 1;

        let user = User::new(
            id,
            name.trim().to_string(),
            email.trim().to_lowercase(),
            age,
        );
        self.users.push(user.clone());
        debug!(user_id = id, total = self.users.len(), "user stored");
        user
    }

    fn list_all(&self) -> &[User] {
        &self.users
    }

    #[instrument(skip(self))]
    fn find_by_id(&self, id: u64) -> Result<User, UserError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    fn delete_by_id(&mut self, id: u64) -> Result<User, UserError> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        Ok(self.users.remove(index))
    }

    fn count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut repo = UserRepoImpl::new();
        let a = repo.add("Ana", "ana@example.com", 30);
        let b = repo.add("Bia", "bia@example.com", 31);
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(repo.count(), 2);
    }

    #[test]
    fn test_add_normalizes_fields() {
        let mut repo = UserRepoImpl::new();
        let user = repo.add("  Ana Silva ", "  Ana@Example.COM ", 30);
        assert_eq!(user.name, "Ana Silva");
        assert_eq!(user.email, "ana@example.com");
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut repo = UserRepoImpl::new();
        repo.add("Ana", "ana@example.com", 30);
        repo.add("Bia", "bia@example.com", 31);

        let removed = repo.delete_by_id(1).unwrap();
        assert_eq!(removed.name, "Ana");

        let c = repo.add("Caio", "caio@example.com", 32);
        assert_eq!(c.id, 3);

        let ids: Vec<u64> = repo.list_all().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_find_round_trip() {
        let mut repo = UserRepoImpl::new();
        let added = repo.add("Ana", "ana@example.com", 30);
        assert_eq!(repo.find_by_id(added.id).unwrap(), added);
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let mut repo = UserRepoImpl::new();
        assert!(matches!(repo.find_by_id(1), Err(UserError::NotFound(ref id)) if id == "1"));
        assert!(matches!(repo.delete_by_id(1), Err(UserError::NotFound(ref id)) if id == "1"));

        repo.add("Ana", "ana@example.com", 30);
        repo.delete_by_id(1).unwrap();
        assert!(matches!(repo.find_by_id(1), Err(UserError::NotFound(ref id)) if id == "1"));
        assert!(matches!(repo.delete_by_id(1), Err(UserError::NotFound(ref id)) if id == "1"));
        assert_eq!(repo.count(), 0);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut repo = UserRepoImpl::new();
        for (i, name) in ["Ana", "Bia", "Caio", "Duda"].iter().enumerate() {
            repo.add(name, &format!("user{i}@example.com"), 20);
        }
        repo.delete_by_id(2).unwrap();

        let names: Vec<&str> = repo.list_all().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Caio", "Duda"]);
    }
}
