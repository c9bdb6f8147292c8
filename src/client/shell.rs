//! Interactive menus
//!
//! Reads commands line by line from any `BufRead` and writes to any `Write`,
//! so tests can script a session.

use super::{ApiClient, ClientError, ClientResult, TokenFile};
use crate::models::NO_RATINGS_YET;
use std::io::{BufRead, Write};
use tracing::debug;

const AUTH_MENU: &str = "\nCommands: register | login | exit";
const MAIN_MENU: &str = "\n1) List modules\n\
2) View professor ratings\n\
3) Average rating of a professor in a module\n\
4) Rate a professor\n\
logout | exit";

pub struct Shell<R, W> {
    api: ApiClient,
    tokens: TokenFile,
    input: R,
    output: W,
}

/// Accepts a single digit 1-5
pub fn parse_rating(raw: &str) -> ClientResult<i32> {
    match raw.trim() {
        digit @ ("1" | "2" | "3" | "4" | "5") => Ok(digit.parse().unwrap_or_default()),
        _ => Err(ClientError::Input(
            "Rating must be a whole number between 1 and 5.".to_string(),
        )),
    }
}

fn parse_int<T: std::str::FromStr>(raw: &str, field: &str) -> ClientResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Input(format!("{} must be a number.", field)))
}

fn parse_optional_int(raw: &str, field: &str) -> ClientResult<Option<i32>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_int(raw, field).map(Some)
    }
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(api: ApiClient, tokens: TokenFile, input: R, output: W) -> Self {
        Self {
            api,
            tokens,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until `exit` or end of input
    pub async fn run(&mut self) -> ClientResult<()> {
        if let Some(token) = self.tokens.load()? {
            debug!("Resuming session from {}", self.tokens.path().display());
            self.api.set_token(Some(token));
        }

        writeln!(self.output, "Welcome to ProfRate.")?;
        loop {
            let keep_going = if self.api.token().is_some() {
                self.main_menu().await?
            } else {
                self.auth_menu().await?
            };
            if !keep_going {
                break;
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    /// `None` at end of input
    fn prompt(&mut self, label: &str) -> ClientResult<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Print a failed command and keep going; only I/O errors are fatal
    fn report(&mut self, err: ClientError) -> ClientResult<()> {
        match err {
            ClientError::Io(e) => Err(ClientError::Io(e)),
            ClientError::Api { status: 401, detail } if self.api.token().is_some() => {
                self.api.set_token(None);
                self.tokens.delete()?;
                writeln!(self.output, "Error: {}", detail)?;
                writeln!(self.output, "Session expired. Please log in again.")?;
                Ok(())
            }
            other => {
                writeln!(self.output, "Error: {}", other)?;
                Ok(())
            }
        }
    }

    async fn auth_menu(&mut self) -> ClientResult<bool> {
        writeln!(self.output, "{}", AUTH_MENU)?;
        let Some(command) = self.prompt("> ")? else {
            return Ok(false);
        };

        let result = match command.to_lowercase().as_str() {
            "register" => self.register().await,
            "login" => self.login().await,
            "exit" | "quit" => return Ok(false),
            "" => Ok(true),
            other => {
                writeln!(self.output, "Unknown command: {}", other)?;
                Ok(true)
            }
        };

        match result {
            Ok(keep_going) => Ok(keep_going),
            Err(e) => self.report(e).map(|_| true),
        }
    }

    async fn main_menu(&mut self) -> ClientResult<bool> {
        writeln!(self.output, "{}", MAIN_MENU)?;
        let Some(command) = self.prompt("> ")? else {
            return Ok(false);
        };

        let result = match command.to_lowercase().as_str() {
            "1" => self.show_modules().await,
            "2" => self.show_professors().await,
            "3" => self.show_average().await,
            "4" => self.rate().await,
            "logout" => self.logout().await,
            "exit" | "quit" => return Ok(false),
            "" => Ok(true),
            other => {
                writeln!(self.output, "Unknown command: {}", other)?;
                Ok(true)
            }
        };

        match result {
            Ok(keep_going) => Ok(keep_going),
            Err(e) => self.report(e).map(|_| true),
        }
    }

    async fn register(&mut self) -> ClientResult<bool> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(false);
        };
        let Some(email) = self.prompt("Email (optional): ")? else {
            return Ok(false);
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(false);
        };

        let user = self.api.register(&username, &email, &password).await?;
        writeln!(self.output, "Registered {}. You can now log in.", user.username)?;
        Ok(true)
    }

    async fn login(&mut self) -> ClientResult<bool> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(false);
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(false);
        };

        let token = self.api.login(&username, &password).await?;
        self.tokens.save(&token)?;
        writeln!(self.output, "Login successful.")?;
        Ok(true)
    }

    async fn logout(&mut self) -> ClientResult<bool> {
        let result = self.api.logout().await;
        // The local token goes either way
        self.api.set_token(None);
        self.tokens.delete()?;

        match result {
            Ok(message) => writeln!(self.output, "{}", message)?,
            Err(ClientError::Api { status: 401, .. }) => {
                writeln!(self.output, "Logged out (the session had already ended).")?
            }
            Err(e) => return Err(e),
        }
        Ok(true)
    }

    async fn show_modules(&mut self) -> ClientResult<bool> {
        let modules = self.api.list_modules().await?;
        if modules.is_empty() {
            writeln!(self.output, "No modules found.")?;
        }
        for module in modules {
            let professors: Vec<String> = module
                .professors
                .iter()
                .map(|p| format!("{} ({})", p.name, p.id))
                .collect();
            writeln!(
                self.output,
                "{:<8} {:<30} {} Semester {}  Taught by: {}",
                module.code,
                module.name,
                module.year,
                module.semester,
                professors.join(", ")
            )?;
        }
        Ok(true)
    }

    async fn show_professors(&mut self) -> ClientResult<bool> {
        let professors = self.api.list_professors().await?;
        if professors.is_empty() {
            writeln!(self.output, "No professors found.")?;
        }
        for professor in professors {
            writeln!(
                self.output,
                "The rating of {} ({}) is {}",
                professor.name, professor.id, professor.average_rating
            )?;
        }
        Ok(true)
    }

    async fn show_average(&mut self) -> ClientResult<bool> {
        let Some(professor) = self.prompt("Professor ID: ")? else {
            return Ok(false);
        };
        let professor_id: i64 = parse_int(&professor, "Professor ID")?;
        let Some(code) = self.prompt("Module code: ")? else {
            return Ok(false);
        };
        let Some(year) = self.prompt("Year (optional): ")? else {
            return Ok(false);
        };
        let year = parse_optional_int(&year, "Year")?;
        let Some(semester) = self.prompt("Semester (optional): ")? else {
            return Ok(false);
        };
        let semester = parse_optional_int(&semester, "Semester")?;

        let summary = self
            .api
            .average_rating(professor_id, &code, year, semester)
            .await?;
        let average = match summary.average_rating.score() {
            Some(score) => score.to_string(),
            None => NO_RATINGS_YET.to_string(),
        };
        writeln!(
            self.output,
            "The rating of {} ({}) in module {} ({}) is {}",
            summary.professor_name,
            summary.professor_id,
            summary.module_name,
            summary.module_code,
            average
        )?;
        Ok(true)
    }

    async fn rate(&mut self) -> ClientResult<bool> {
        let Some(professor) = self.prompt("Professor ID: ")? else {
            return Ok(false);
        };
        let professor_id: i64 = parse_int(&professor, "Professor ID")?;
        let Some(code) = self.prompt("Module code: ")? else {
            return Ok(false);
        };
        let Some(year) = self.prompt("Year: ")? else {
            return Ok(false);
        };
        let year: i32 = parse_int(&year, "Year")?;
        let Some(semester) = self.prompt("Semester: ")? else {
            return Ok(false);
        };
        let semester: i32 = parse_int(&semester, "Semester")?;
        let Some(rating) = self.prompt("Rating (1-5): ")? else {
            return Ok(false);
        };
        let rating = parse_rating(&rating)?;

        let message = self
            .api
            .rate(professor_id, &code, year, semester, rating)
            .await?;
        writeln!(self.output, "{}", message)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn shell(script: &str, tokens: TokenFile) -> Shell<Cursor<Vec<u8>>, Vec<u8>> {
        // Nothing listens here; these tests never reach the network
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        Shell::new(api, tokens, Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    fn output(shell: Shell<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4").unwrap(), 4);
        assert_eq!(parse_rating(" 1 ").unwrap(), 1);
        assert!(parse_rating("0").is_err());
        assert!(parse_rating("6").is_err());
        assert!(parse_rating("4.5").is_err());
        assert!(parse_rating("five").is_err());
    }

    #[tokio::test]
    async fn test_starts_in_auth_menu_without_token() {
        let dir = tempdir().unwrap();
        let mut shell = shell("help\nexit\n", TokenFile::new(dir.path().join("token")));
        shell.run().await.unwrap();

        let out = output(shell);
        assert!(out.contains("register | login | exit"));
        assert!(out.contains("Unknown command: help"));
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[tokio::test]
    async fn test_starts_in_main_menu_with_token() {
        let dir = tempdir().unwrap();
        let tokens = TokenFile::new(dir.path().join("token"));
        tokens.save("abc123").unwrap();

        let mut shell = shell("", tokens);
        shell.run().await.unwrap();

        let out = output(shell);
        assert!(out.contains("4) Rate a professor"));
        assert!(!out.contains("register | login | exit"));
    }

    #[tokio::test]
    async fn test_rating_checked_before_sending() {
        let dir = tempdir().unwrap();
        let tokens = TokenFile::new(dir.path().join("token"));
        tokens.save("abc123").unwrap();

        let mut shell = shell("4\n1\nCS3021\n2024\n1\n9\nexit\n", tokens);
        shell.run().await.unwrap();

        let out = output(shell);
        assert!(out.contains("Error: Rating must be a whole number between 1 and 5."));
    }
}
