use std::path::Path;

use anyhow::Context;
use common::Student;
use placement_client::{RosterContext, SessionContext};
use roster::{SortDirection, StudentFilter, parse_columns};

use crate::{RosterArgs, resolve_batch_year};

pub async fn list(ctx: &SessionContext, args: &RosterArgs) -> anyhow::Result<()> {
    let roster = load_roster(ctx, args).await?;
    let rows = roster.view(&filter(args), args.sort, direction(args));
    for student in &rows {
        let placement = match (&student.company_name, student.package_lpa) {
            (Some(company), Some(pkg)) => format!(" @ {company} {pkg:.2} LPA"),
            (Some(company), None) => format!(" @ {company}"),
            _ => String::new(),
        };
        println!(
            "{} {} [{}] cgpa={:.2} {}{placement}",
            student.roll_number,
            student.name,
            student.department,
            student.cgpa,
            student.placement_status
        );
    }
    println!("{} of {} students", rows.len(), roster.students().len());
    Ok(())
}

pub async fn stats(ctx: &SessionContext, args: &RosterArgs) -> anyhow::Result<()> {
    let roster = load_roster(ctx, args).await?;
    let stats = roster.stats(&filter(args));
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub async fn export(
    ctx: &SessionContext,
    args: &RosterArgs,
    columns: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let columns = parse_columns(columns)?;
    let roster = load_roster(ctx, args).await?;
    let filter = filter(args);
    let csv = roster.export_csv(&filter, args.sort, direction(args), &columns)?;
    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed writing export: {}", path.display()))?;
            let rows = roster.view(&filter, args.sort, direction(args)).len();
            println!("exported {rows} students to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

async fn load_roster(ctx: &SessionContext, args: &RosterArgs) -> anyhow::Result<RosterContext> {
    if let Some(input) = &args.input {
        let raw = std::fs::read_to_string(input)
            .with_context(|| format!("failed reading roster: {}", input.display()))?;
        let students: Vec<Student> = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing roster: {}", input.display()))?;
        let batch_year = args
            .batch
            .or_else(|| students.first().map(|s| s.batch_year))
            .unwrap_or_default();
        return Ok(RosterContext::new(batch_year, students));
    }
    let client = ctx.client()?;
    let batch_year = resolve_batch_year(ctx, &client, args.batch).await?;
    Ok(RosterContext::load(&client, batch_year).await?)
}

fn filter(args: &RosterArgs) -> StudentFilter {
    StudentFilter {
        search: args.search.clone(),
        department: args.department.clone(),
        status: args.status,
        min_cgpa: args.min_cgpa,
    }
}

const fn direction(args: &RosterArgs) -> SortDirection {
    if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}
