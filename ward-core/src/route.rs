//! Đường dẫn điều hướng giữa các trang.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Board,
    Dynamics { id: String },
    Chat { id: String },
    NewPatient,
    NotFound,
}

impl Route {
    /// Phân tích đường dẫn (`/`, `/patient/{id}/dynamics`, `/patient/{id}/chat`,
    /// `/patient/new`); chấp nhận tiền tố `#` của hash.
    pub fn parse(path: &str) -> Self {
        let path = path.trim_start_matches('#');
        let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Board,
            ["patient", "new"] => Route::NewPatient,
            ["patient", id, "dynamics"] => Route::Dynamics { id: id.to_string() },
            ["patient", id, "chat"] => Route::Chat { id: id.to_string() },
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Board | Route::NotFound => "/".to_string(),
            Route::Dynamics { id } => format!("/patient/{id}/dynamics"),
            Route::Chat { id } => format!("/patient/{id}/chat"),
            Route::NewPatient => "/patient/new".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Board);
        assert_eq!(Route::parse(""), Route::Board);
        assert_eq!(Route::parse("#/patient/new"), Route::NewPatient);
        assert_eq!(
            Route::parse("/patient/p-7/dynamics"),
            Route::Dynamics {
                id: "p-7".to_string()
            }
        );
        assert_eq!(
            Route::parse("#/patient/p-7/chat"),
            Route::Chat {
                id: "p-7".to_string()
            }
        );
        assert_eq!(Route::parse("/patient/p-7"), Route::NotFound);
    }

    #[test]
    fn path_round_trips() {
        for route in [
            Route::Board,
            Route::NewPatient,
            Route::Chat {
                id: "p-1".to_string(),
            },
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }
}
