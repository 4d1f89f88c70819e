use depot_config::config::Config;
use depot_core::{
    database::open_database,
    users::{add_user, list_users},
    DepotResult,
};
use tracing::info;

use crate::cli::UserAction;

pub fn handle_user_action(config: &Config, action: &UserAction) -> DepotResult<()> {
    let mut db = open_database(config)?;

    match action {
        UserAction::Add { username, email } => {
            let user = add_user(db.conn(), username, email.as_deref())?;
            info!("Created user {}", user.username);
        }
        UserAction::List => {
            for user in list_users(db.conn())? {
                match user.email {
                    Some(email) => info!("{} <{}>", user.username, email),
                    None => info!("{}", user.username),
                }
            }
        }
    }

    Ok(())
}
