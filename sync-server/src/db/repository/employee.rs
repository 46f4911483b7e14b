//! Employee Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Employee, EmployeeCreate, EmployeeUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct EmployeeRepository {
    base: BaseRepository,
}

impl EmployeeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active employees
    pub async fn find_all(&self) -> RepoResult<Vec<Employee>> {
        let employees: Vec<Employee> = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE is_active = true ORDER BY display_name")
            .await?
            .take(0)?;
        Ok(employees)
    }

    /// Find all employees including deactivated ones
    pub async fn find_all_with_inactive(&self) -> RepoResult<Vec<Employee>> {
        let employees: Vec<Employee> = self
            .base
            .db()
            .query("SELECT * FROM employee ORDER BY display_name")
            .await?
            .take(0)?;
        Ok(employees)
    }

    /// Find employee by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Employee>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let emp: Option<Employee> = self.base.db().select(thing).await?;
        Ok(emp)
    }

    /// Find employee by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<Employee>> {
        let username_owned = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE username = $username LIMIT 1")
            .bind(("username", username_owned))
            .await?;
        let employees: Vec<Employee> = result.take(0)?;
        Ok(employees.into_iter().next())
    }

    /// Find employee by email (admin promotion path)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Employee>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM employee WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let employees: Vec<Employee> = result.take(0)?;
        Ok(employees.into_iter().next())
    }

    /// Create a new employee
    pub async fn create(&self, data: EmployeeCreate) -> RepoResult<Employee> {
        // Check duplicate username / email before touching the unique indexes
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                data.email
            )));
        }

        let hash_pass = Employee::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let display_name = data.display_name.unwrap_or_else(|| data.username.clone());

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE employee SET
                    username = $username,
                    display_name = $display_name,
                    email = $email,
                    employee_code = $employee_code,
                    feedback_sheet_url = NONE,
                    hash_pass = $hash_pass,
                    has_completed_setup = false,
                    is_admin = false,
                    is_active = true
                RETURN AFTER"#,
            )
            .bind(("username", data.username))
            .bind(("display_name", display_name))
            .bind(("email", data.email))
            .bind(("employee_code", data.employee_code))
            .bind(("hash_pass", hash_pass))
            .await?;

        let created: Option<Employee> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create employee".to_string()))
    }

    /// Update an employee (self profile edit or admin inline edit)
    pub async fn update(&self, id: &str, data: EmployeeUpdate) -> RepoResult<Employee> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))?;

        // Check duplicate email if changing
        if let Some(ref new_email) = data.email
            && new_email != &existing.email
            && self.find_by_email(new_email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                new_email
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    display_name = $display_name OR display_name,
                    email = $email OR email,
                    employee_code = $employee_code OR employee_code,
                    feedback_sheet_url = $feedback_sheet_url OR feedback_sheet_url,
                    is_active = IF $has_is_active THEN $is_active ELSE is_active END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("display_name", data.display_name))
            .bind(("email", data.email))
            .bind(("employee_code", data.employee_code))
            .bind(("feedback_sheet_url", data.feedback_sheet_url))
            .bind(("has_is_active", data.is_active.is_some()))
            .bind(("is_active", data.is_active))
            .await?;

        result
            .take::<Option<Employee>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))
    }

    /// Grant the admin role (takes effect on next token issue)
    pub async fn set_admin(&self, id: &str) -> RepoResult<Employee> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET is_admin = true RETURN AFTER")
            .bind(("thing", thing))
            .await?;
        result
            .take::<Option<Employee>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))
    }

    /// Mark first-time setup as finished
    pub async fn set_setup_complete(&self, id: &str) -> RepoResult<Employee> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET has_completed_setup = true RETURN AFTER")
            .bind(("thing", thing))
            .await?;
        result
            .take::<Option<Employee>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))
    }

    /// Hard delete an employee and cascade to their attendance and
    /// onboarding documents
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Employee {} not found", id)))?;

        let employee_id = existing
            .id
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| id.to_string());

        self.base
            .db()
            .query(
                r#"
                DELETE attendance WHERE employee_id = $employee_id;
                DELETE learning_hour_attendance WHERE employee_id = $employee_id;
                DELETE onboarding_status WHERE employee_id = $employee_id;
                DELETE $thing;
                "#,
            )
            .bind(("employee_id", employee_id))
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::EmployeeCreate;

    fn sample(username: &str, email: &str) -> EmployeeCreate {
        EmployeeCreate {
            username: username.to_string(),
            password: "correct-horse-battery".to_string(),
            display_name: Some(format!("{username} (test)")),
            email: email.to_string(),
            employee_code: "NXT-0001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = EmployeeRepository::new(svc.db.clone());

        let created = repo.create(sample("asha", "asha@example.com")).await.unwrap();
        assert!(!created.is_admin);
        assert!(!created.has_completed_setup);

        let by_email = repo.find_by_email("asha@example.com").await.unwrap();
        assert!(by_email.is_some());
        assert_eq!(by_email.unwrap().username, "asha");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = EmployeeRepository::new(svc.db.clone());

        repo.create(sample("asha", "asha@example.com")).await.unwrap();
        let err = repo.create(sample("asha", "other@example.com")).await;
        assert!(matches!(err, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_promote_sets_admin_flag() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = EmployeeRepository::new(svc.db.clone());

        let created = repo.create(sample("lead", "lead@example.com")).await.unwrap();
        let id = created.id.as_ref().unwrap().to_string();
        let promoted = repo.set_admin(&id).await.unwrap();
        assert!(promoted.is_admin);
    }

    #[tokio::test]
    async fn test_password_round_trip() {
        let svc = DbService::in_memory().await.unwrap();
        let repo = EmployeeRepository::new(svc.db.clone());

        let created = repo.create(sample("asha", "asha@example.com")).await.unwrap();
        let id = created.id.as_ref().unwrap().to_string();
        let fetched = repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(fetched.verify_password("correct-horse-battery").unwrap());
        assert!(!fetched.verify_password("wrong").unwrap());
    }
}
