//! Session key helpers.
//!
//! The session carries only the user id and email; everything else is
//! read from the database per request so profile edits take effect
//! immediately.

use tower_sessions::Session;

const SESSION_USER_ID_KEY: &str = "user_id";
const SESSION_EMAIL_KEY: &str = "email";

pub async fn get_user_id(session: &Session) -> Option<String> {
    session.get::<String>(SESSION_USER_ID_KEY).await.ok().flatten()
}

pub async fn get_email(session: &Session) -> Option<String> {
    session.get::<String>(SESSION_EMAIL_KEY).await.ok().flatten()
}

pub async fn set_user(session: &Session, user_id: &str, email: &str) -> anyhow::Result<()> {
    session
        .insert(SESSION_USER_ID_KEY, user_id.to_string())
        .await?;
    session.insert(SESSION_EMAIL_KEY, email.to_string()).await?;
    Ok(())
}

pub async fn clear(session: &Session) -> anyhow::Result<()> {
    session.flush().await?;
    Ok(())
}
