pub mod mongo;
pub mod sqlserver;

pub use mongo::MongoManager;
pub use sqlserver::{SqlClient, SqlServerManager};

/// Mask the password of a connection URI for logging
pub fn mask_database_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(scheme_pos) = url[..colon_pos].rfind("://") {
                let scheme_end = scheme_pos + 3;
                let username_part = &url[scheme_end..colon_pos];
                let after_at = &url[at_pos..];
                return format!("{}{}:****{}", &url[..scheme_end], username_part, after_at);
            }
        }
    }
    url.to_string()
}
