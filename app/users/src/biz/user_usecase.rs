use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{User, UserCandidate};
use super::validator;
use crate::error::UserError;

/// 用户存储
///
/// 实现方只负责集合操作，不做任何校验；并发访问由 [`UserUseCase`] 加锁保证。
pub trait UserRepo: Send + Sync + std::fmt::Debug {
    /// 分配新 id 并追加记录，name 去除首尾空白，email 去除首尾空白并转小写
    fn add(&mut self, name: &str, email: &str, age: u8) -> User;

    /// 按插入顺序返回全部记录
    fn list_all(&self) -> &[User];

    fn find_by_id(&self, id: u64) -> Result<User, UserError>;

    /// 删除并返回记录，其余记录的 id 保持不变
    fn delete_by_id(&mut self, id: u64) -> Result<User, UserError>;

    fn count(&self) -> usize;
}

/// 用户业务逻辑用例
#[derive(Debug)]
pub struct UserUseCase<R: UserRepo> {
    user_repo: RwLock<R>,
}

impl<R: UserRepo> UserUseCase<R> {
    pub fn new(user_repo: R) -> Self {
        Self {
            user_repo: RwLock::new(user_repo),
        }
    }

    /// 校验并创建用户；写锁覆盖校验与写入，保证邮箱唯一与 id 单调
    #[instrument(skip(self, candidate))]
    pub async fn create_user(&self, candidate: UserCandidate) -> Result<User, UserError> {
        let mut repo = self.user_repo.write().await;

        let new_user =
            validator::check(&candidate, repo.list_all()).map_err(UserError::Validation)?;
        let user = repo.add(&new_user.name, &new_user.email, new_user.age);

        debug!(user_id = user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Vec<User> {
        self.user_repo.read().await.list_all().to_vec()
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: u64) -> Result<User, UserError> {
        self.user_repo.read().await.find_by_id(id)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: u64) -> Result<User, UserError> {
        let user = self.user_repo.write().await.delete_by_id(id)?;

        debug!(user_id = user.id, "user deleted");
        Ok(user)
    }

    pub async fn count(&self) -> usize {
        self.user_repo.read().await.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biz::FieldError;
    use crate::data::UserRepoImpl;
    use serde_json::json;
    use std::sync::Arc;

    fn usecase() -> UserUseCase<UserRepoImpl> {
        UserUseCase::new(UserRepoImpl::new())
    }

    fn candidate(name: &str, email: &str, age: u8) -> UserCandidate {
        UserCandidate::from_json(json!({"name": name, "email": email, "age": age}))
    }

    #[tokio::test]
    async fn test_create_normalizes_and_assigns_first_id() {
        let uc = usecase();

        let user = uc
            .create_user(candidate("Ana Silva", "Ana@Example.com", 30))
            .await
            .unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Ana Silva");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.age, 30);

        let err = uc
            .create_user(UserCandidate::from_json(
                json!({"name": "Bo", "email": "b@x.com", "age": 200}),
            ))
            .await
            .unwrap_err();
        match err {
            UserError::Validation(errors) => assert_eq!(
                errors,
                vec![FieldError::NameTooShort, FieldError::AgeOutOfRange]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(uc.count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_case_insensitively() {
        let uc = usecase();
        uc.create_user(candidate("Ana Silva", "ana@example.com", 30))
            .await
            .unwrap();

        let err = uc
            .create_user(candidate("Ana Other", "ANA@EXAMPLE.COM", 31))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(ref e) if e == &vec![FieldError::EmailTaken]));
        assert_eq!(uc.count().await, 1);
    }

    #[tokio::test]
    async fn test_deleted_email_can_be_registered_again() {
        let uc = usecase();
        let first = uc
            .create_user(candidate("Ana Silva", "ana@example.com", 30))
            .await
            .unwrap();
        uc.delete_user(first.id).await.unwrap();

        let second = uc
            .create_user(candidate("Ana Silva", "ana@example.com", 30))
            .await
            .unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_get_and_delete_round_trip() {
        let uc = usecase();
        let created = uc
            .create_user(candidate("Carla", "carla@example.com", 44))
            .await
            .unwrap();

        assert_eq!(uc.get_user(created.id).await.unwrap(), created);
        assert_eq!(uc.list_users().await, vec![created.clone()]);

        assert_eq!(uc.delete_user(created.id).await.unwrap(), created);
        assert!(matches!(
            uc.get_user(created.id).await,
            Err(UserError::NotFound(ref id)) if id == "1"
        ));
        assert!(matches!(
            uc.delete_user(created.id).await,
            Err(UserError::NotFound(ref id)) if id == "1"
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_ids_and_emails_unique() {
        let uc = Arc::new(usecase());

        let mut handles = Vec::new();
        for i in 0..32 {
            let uc = Arc::clone(&uc);
            handles.push(tokio::spawn(async move {
                // 每个邮箱提交两次，只能成功一次
                let email = format!("user{}@example.com", i % 16);
                uc.create_user(candidate("Concurrent", &email, 20)).await
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            if let Ok(user) = handle.await.unwrap() {
                ids.push(user.id);
            }
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<u64>>());
        assert_eq!(uc.count().await, 16);
    }
}
