use serde::Serialize;

use crate::admin::AdminService;
use crate::console::view::{render_table, OutputFormat, ViewState};
use crate::error::AuthError;
use crate::models::User;
use crate::repository::Repository;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub last_sign_in: String,
    pub disabled: bool,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            name: user
                .display_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "No name".to_string()),
            last_sign_in: user
                .last_login
                .map(|at| at.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "Never".to_string()),
            id: user.uid,
            email: user.email,
            admin: user.admin,
            disabled: user.disabled,
        }
    }
}

impl UserRow {
    pub fn role(&self) -> &'static str {
        if self.admin {
            "Admin"
        } else {
            "User"
        }
    }

    pub fn status(&self) -> &'static str {
        if self.disabled {
            "Disabled"
        } else {
            "Active"
        }
    }
}

/// User management table
pub struct UsersView {
    pub state: ViewState<Vec<UserRow>>,
}

impl UsersView {
    pub async fn load(repo: &Repository) -> Self {
        let users = repo
            .list_users()
            .await
            .map(|users| users.into_iter().map(UserRow::from).collect());
        Self {
            state: ViewState::from_result(users, "Error fetching users"),
        }
    }

    /// Request the admin role for `uid` and reflect it in the table on success
    pub async fn promote(&mut self, admin: &AdminService, uid: &str) -> Result<(), AuthError> {
        admin.make_user_admin(uid).await?;

        if let Some(rows) = self.state.loaded_mut() {
            for row in rows.iter_mut().filter(|row| row.id == uid) {
                row.admin = true;
            }
        }
        Ok(())
    }

    pub fn render(&self, format: OutputFormat) -> String {
        if format == OutputFormat::Json {
            return self.state.to_json();
        }

        let rows = match &self.state {
            ViewState::Loaded(rows) => rows,
            ViewState::Failed(message) => return format!("User Management\n\nerror: {message}"),
        };

        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    row.name.clone(),
                    row.email.clone(),
                    row.role().to_string(),
                    row.last_sign_in.clone(),
                    row.status().to_string(),
                ]
            })
            .collect();

        format!(
            "User Management\n\n{}",
            render_table(
                &["Uid", "User", "Email", "Role", "Last Sign In", "Status"],
                &cells
            )
        )
    }
}
