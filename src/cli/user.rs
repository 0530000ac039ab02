use crate::repository::UserRepository;
use crate::types::User;

use super::{StoreArgs, confirm_action, init_repositories};

pub fn run_user_add(
    args: &StoreArgs,
    name: String,
    email: String,
    external_id: Option<String>,
    admin: bool,
) -> anyhow::Result<()> {
    let (users, _) = init_repositories(args)?;

    if name.trim().is_empty() {
        anyhow::bail!("--name cannot be empty");
    }
    if !email.contains('@') {
        anyhow::bail!("'{}' is not a valid email address", email);
    }

    let mut user = User {
        name,
        email,
        external_id: external_id.unwrap_or_default(),
        is_admin: admin,
        ..User::default()
    };
    users.upsert(&mut user)?;

    println!("Created user {} \"{}\" <{}>", user.id, user.name, user.email);
    Ok(())
}

pub fn run_user_list(args: &StoreArgs) -> anyhow::Result<()> {
    let (users, _) = init_repositories(args)?;
    let all = users.list()?;

    if all.is_empty() {
        println!("No users");
        return Ok(());
    }

    for user in all {
        let marker = if user.is_admin { " (admin)" } else { "" };
        println!("{}\t{}\t{}{}", user.id, user.name, user.email, marker);
    }
    Ok(())
}

pub fn run_user_show(args: &StoreArgs, id: i64) -> anyhow::Result<()> {
    let (users, _) = init_repositories(args)?;
    let user = users.get(id)?;

    if !user.exists() {
        anyhow::bail!("User {} not found", id);
    }

    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

pub fn run_user_own(args: &StoreArgs, user_id: i64, paper_id: i64) -> anyhow::Result<()> {
    let (users, _) = init_repositories(args)?;

    let owner = users.paper_owner(paper_id)?;
    if owner != 0 && owner != user_id {
        anyhow::bail!("Paper {} is already owned by user {}", paper_id, owner);
    }

    let mut user = users.get(user_id)?;
    if !user.exists() {
        anyhow::bail!("User {} not found", user_id);
    }

    user.owns.insert(paper_id);
    users.upsert(&mut user)?;

    println!("User {} now owns paper {}", user_id, paper_id);
    Ok(())
}

pub fn run_user_delete(
    args: &StoreArgs,
    id: i64,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let (users, _) = init_repositories(args)?;

    let user = users.get(id)?;
    if !user.exists() {
        anyhow::bail!("User {} not found", id);
    }

    let message = format!("Delete user {} \"{}\" and all their facts?", id, user.name);
    if !confirm_action(&message, yes, non_interactive)? {
        println!("Cancelled");
        return Ok(());
    }

    users.delete(id)?;
    println!("Deleted user {}", id);
    Ok(())
}
