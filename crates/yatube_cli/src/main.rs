//! CLI smoke entry point.
//!
//! Opens an in-memory store, seeds one author and post, and prints the
//! first index page to verify `yatube_core` wiring end to end.

use std::process::ExitCode;
use yatube_core::db::open_db_in_memory;
use yatube_core::{
    CoreConfig, FeedService, PostDraft, PostService, RequestContext, SqliteStore, User,
    UserService,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("yatube_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::default();
    let conn = open_db_in_memory()?;
    let store = SqliteStore::new(&conn);

    let author = User::new("smoke-author");
    UserService::new(store).register(&author)?;

    let ctx = RequestContext::authenticated(author, "/new/");
    PostService::new(store, &config)?
        .create_post(&ctx, &PostDraft::new("hello from the cli"))?
        .committed()
        .ok_or("smoke post was not created")?;

    let page = FeedService::new(store, &config)?.index(None)?;
    println!("yatube_core version={}", yatube_core::core_version());
    println!(
        "index page={}/{} posts={}",
        page.number, page.num_pages, page.count
    );
    for entry in &page.items {
        println!("- {} by {}", entry.post, entry.author.username);
    }
    Ok(())
}
