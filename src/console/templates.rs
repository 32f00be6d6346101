//! Canned statements that can be loaded into the editor.

use std::fmt;
use std::str::FromStr;

use crate::error::ConsoleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    CreateDatabase,
    Use,
    CreateTable,
    Insert,
    Update,
    Delete,
    Select,
}

impl Template {
    /// All templates, in template bar order.
    pub const ALL: [Template; 7] = [
        Template::CreateDatabase,
        Template::Use,
        Template::CreateTable,
        Template::Insert,
        Template::Update,
        Template::Delete,
        Template::Select,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::CreateDatabase => "create_db",
            Self::Use => "use",
            Self::CreateTable => "create_table",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Select => "select",
        }
    }

    /// Short label for the template bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateDatabase => "CREATE DB",
            Self::Use => "USE",
            Self::CreateTable => "CREATE TABLE",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Select => "SELECT",
        }
    }

    pub fn statement(&self) -> &'static str {
        match self {
            Self::CreateDatabase => "CREATE DATABASE my_database;",
            Self::Use => "USE my_database;",
            Self::CreateTable => concat!(
                "CREATE TABLE users (\n",
                "  id INT PRIMARY KEY AUTO_INCREMENT,\n",
                "  name VARCHAR(100) NOT NULL,\n",
                "  email VARCHAR(100),\n",
                "  signup_date DATE\n",
                ");"
            ),
            Self::Insert => {
                "INSERT INTO users (name, email, signup_date) VALUES ('John Doe', 'john@email.com', '2025-10-26');"
            }
            Self::Update => "UPDATE users SET email = 'new@email.com' WHERE id = 1;",
            Self::Delete => "DELETE FROM users WHERE id = 1;",
            Self::Select => "SELECT * FROM users;",
        }
    }

    /// Template bound to the 1-based shortcut digit.
    pub fn from_shortcut(digit: char) -> Option<Self> {
        let index = digit.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Template {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.key() == s)
            .copied()
            .ok_or_else(|| ConsoleError::validation(format!("Unknown template '{s}'")))
    }
}
