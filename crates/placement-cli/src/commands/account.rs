use anyhow::Context;
use placement_client::SessionContext;

pub async fn login(
    ctx: &mut SessionContext,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = password
        .or_else(|| std::env::var("PLACEMENT_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .context("missing password; pass --password or set PLACEMENT_PASSWORD")?;
    let session = ctx.login(email, &password).await?;
    println!("signed in as {} <{}>", session.user.name, session.user.email);
    Ok(())
}

pub fn logout(ctx: &mut SessionContext) -> anyhow::Result<()> {
    if ctx.logout()? {
        println!("signed out");
    } else {
        println!("no stored session");
    }
    Ok(())
}

pub fn whoami(ctx: &SessionContext) -> anyhow::Result<()> {
    let session = ctx
        .require_session()
        .context("not signed in; run `placement login` first")?;
    let role = session.user.role.as_deref().unwrap_or("member");
    println!(
        "{} <{}> ({role}) at {}",
        session.user.name, session.user.email, session.api_base_url
    );
    Ok(())
}

pub async fn list_batches(ctx: &SessionContext) -> anyhow::Result<()> {
    let batches = ctx.client()?.list_batches().await?;
    let selected = ctx.resolve_batch(&batches);
    for batch in &batches {
        let marker = if Some(batch.batch_year) == selected { "*" } else { " " };
        let name = batch.name.as_deref().unwrap_or_default();
        let active = if batch.is_active { "active" } else { "closed" };
        println!("{marker} {} {name} ({active})", batch.batch_year);
    }
    Ok(())
}

pub fn select_batch(ctx: &mut SessionContext, year: i32) -> anyhow::Result<()> {
    ctx.select_batch(year)?;
    println!("selected batch: {year}");
    Ok(())
}

/// Prints the persisted selection without a network call; otherwise asks
/// the backend for the latest batch.
pub async fn current_batch(ctx: &SessionContext) -> anyhow::Result<()> {
    if let Some(year) = ctx.selected_batch_year() {
        println!("selected batch: {year}");
        return Ok(());
    }
    if ctx.token().is_none() {
        println!("no batch selected");
        return Ok(());
    }
    let batches = ctx.client()?.list_batches().await?;
    match ctx.resolve_batch(&batches) {
        Some(year) => println!("selected batch: {year} (latest)"),
        None => println!("no batch selected"),
    }
    Ok(())
}
