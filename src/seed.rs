use tracing::info;

use crate::{
    auth::password::hash_password,
    store::Store,
    users::repo_types::NewUser,
};

pub const ADMIN_EMAIL: &str = "yoga@studio.com";
pub const ADMIN_PASSWORD: &str = "test!1234";

const TEACHERS: [(&str, &str); 2] = [("Margot", "DELAHAYE"), ("Hélène", "THIERCELIN")];

/// Inserts the two studio teachers and the admin account. Each part is
/// skipped when already present, so restarts are harmless.
pub async fn seed_demo_data(store: &dyn Store) -> anyhow::Result<()> {
    if store.list_teachers().await?.is_empty() {
        for (first, last) in TEACHERS {
            store.create_teacher(first, last).await?;
        }
        info!(count = TEACHERS.len(), "seeded teachers");
    }

    if store.find_user_by_email(ADMIN_EMAIL).await?.is_none() {
        let admin = store
            .create_user(NewUser {
                email: ADMIN_EMAIL.into(),
                first_name: "Admin".into(),
                last_name: "Admin".into(),
                password_hash: hash_password(ADMIN_PASSWORD)?,
                admin: true,
            })
            .await?;
        info!(user_id = admin.id, "seeded admin account");
    }
    Ok(())
}
