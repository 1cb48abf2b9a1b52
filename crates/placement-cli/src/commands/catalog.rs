use placement_client::SessionContext;

pub async fn list_companies(ctx: &SessionContext, batch: Option<i32>) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let batch = batch.or_else(|| ctx.selected_batch_year());
    let companies = client.list_companies(batch).await?;
    for company in &companies {
        let industry = company.industry.as_deref().unwrap_or("-");
        println!(
            "{}. {} [{industry}] batch={} positions={}",
            company.id.unwrap_or_default(),
            company.name,
            company.batch_year,
            company.positions.len()
        );
        for position in &company.positions {
            let package = position
                .package_lpa
                .map(|p| format!("{p:.2} LPA"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   - {} {} ({package}, documents={})",
                position.id.unwrap_or_default(),
                position.position_title,
                position.documents.len()
            );
        }
    }
    Ok(())
}

pub async fn list_offers(ctx: &SessionContext, batch: Option<i32>) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let batch = batch.or_else(|| ctx.selected_batch_year());
    let offers = client.list_offers(batch).await?;
    for offer in &offers {
        println!(
            "{}. student={} company={} {:.2} LPA on {} ({})",
            offer.id.unwrap_or_default(),
            offer.student_id,
            offer.company_id,
            offer.package_lpa,
            offer.offer_date,
            offer.status.as_str()
        );
    }
    Ok(())
}
