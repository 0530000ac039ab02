use crate::access::resolve;
use crate::types::Access;

use super::{StoreArgs, init_repositories};

pub fn run_access(args: &StoreArgs, user_id: i64, paper_id: i64) -> anyhow::Result<()> {
    let (users, _) = init_repositories(args)?;
    let access = resolve(&users, user_id, paper_id)?;

    println!("User {} on paper {}: {}", user_id, paper_id, access);

    if access == Access::NONE {
        std::process::exit(1);
    }
    Ok(())
}
