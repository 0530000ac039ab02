use std::collections::BTreeSet;

use crate::repository::{FactTeamRepository, TeamRepository};
use crate::types::{Member, Team};

use super::{StoreArgs, confirm_action, init_repositories};

fn existing_team(teams: &FactTeamRepository, id: i64) -> anyhow::Result<Team> {
    let team = teams.get(id)?;
    if !team.exists() {
        anyhow::bail!("Team {} not found", id);
    }
    Ok(team)
}

fn print_teams(teams: &[Team]) {
    for team in teams {
        println!(
            "{}\t{}\t{} member(s)\t{} paper(s)",
            team.id,
            team.name,
            team.members.len(),
            team.can_see.len()
        );
    }
}

pub fn run_team_create(
    args: &StoreArgs,
    name: String,
    admins: Vec<i64>,
    members: Vec<i64>,
    see: Vec<i64>,
    edit: Vec<i64>,
) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;

    if name.trim().is_empty() {
        anyhow::bail!("--name cannot be empty");
    }

    let can_edit: BTreeSet<i64> = edit.into_iter().collect();
    let can_see: BTreeSet<i64> = see.into_iter().chain(can_edit.iter().copied()).collect();

    let mut team = Team {
        name,
        members: admins
            .into_iter()
            .map(Member::admin)
            .chain(members.into_iter().map(Member::member))
            .collect(),
        can_see,
        can_edit,
        ..Team::default()
    };
    teams.upsert(&mut team)?;

    println!("Created team {} \"{}\"", team.id, team.name);
    Ok(())
}

pub fn run_team_list(args: &StoreArgs) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let all = teams.list()?;

    if all.is_empty() {
        println!("No teams");
        return Ok(());
    }

    print_teams(&all);
    Ok(())
}

pub fn run_team_show(args: &StoreArgs, id: i64) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let team = existing_team(&teams, id)?;

    println!("{}", serde_json::to_string_pretty(&team)?);
    Ok(())
}

pub fn run_team_for_user(args: &StoreArgs, user_id: i64) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let found = teams.get_for_user(user_id)?;

    if found.is_empty() {
        println!("User {} belongs to no teams", user_id);
        return Ok(());
    }

    print_teams(&found);
    Ok(())
}

pub fn run_team_add_member(
    args: &StoreArgs,
    team_id: i64,
    user_id: i64,
    admin: bool,
) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let mut team = existing_team(&teams, team_id)?;

    let member = Member {
        user_id,
        is_team_admin: admin,
    };
    match team.members.iter_mut().find(|m| m.user_id == user_id) {
        Some(existing) => *existing = member,
        None => team.members.push(member),
    }
    teams.upsert(&mut team)?;

    let role = if admin { "admin" } else { "member" };
    println!("User {} is now {} of team {}", user_id, role, team_id);
    Ok(())
}

pub fn run_team_remove_member(args: &StoreArgs, team_id: i64, user_id: i64) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let mut team = existing_team(&teams, team_id)?;

    let before = team.members.len();
    team.members.retain(|m| m.user_id != user_id);
    if team.members.len() == before {
        anyhow::bail!("User {} is not in team {}", user_id, team_id);
    }
    teams.upsert(&mut team)?;

    println!("Removed user {} from team {}", user_id, team_id);
    Ok(())
}

pub fn run_team_grant(
    args: &StoreArgs,
    team_id: i64,
    paper_id: i64,
    edit: bool,
) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let mut team = existing_team(&teams, team_id)?;

    team.can_see.insert(paper_id);
    if edit {
        team.can_edit.insert(paper_id);
    }
    teams.upsert(&mut team)?;

    let right = if edit { "edit" } else { "see" };
    println!("Team {} can now {} paper {}", team_id, right, paper_id);
    Ok(())
}

pub fn run_team_revoke(args: &StoreArgs, team_id: i64, paper_id: i64) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let mut team = existing_team(&teams, team_id)?;

    team.can_see.remove(&paper_id);
    team.can_edit.remove(&paper_id);
    teams.upsert(&mut team)?;

    println!("Revoked team {} access to paper {}", team_id, paper_id);
    Ok(())
}

pub fn run_team_delete(
    args: &StoreArgs,
    id: i64,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let (_, teams) = init_repositories(args)?;
    let team = existing_team(&teams, id)?;

    let message = format!("Delete team {} \"{}\"?", id, team.name);
    if !confirm_action(&message, yes, non_interactive)? {
        println!("Cancelled");
        return Ok(());
    }

    teams.delete(id)?;
    println!("Deleted team {}", id);
    Ok(())
}
