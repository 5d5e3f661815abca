//! Category manager handlers.

use anyhow::Result;
use comfy_table::{ContentArrangement, Table};
use tabs_client::api::categories::{self, CategoryPatch, NewCategory};
use tabs_client::client::ApiClient;
use tabs_client::error::ApiError;

use super::confirm;

pub async fn list(client: &ApiClient) -> Result<()> {
    let all = categories::list(client).await?;

    if all.is_empty() {
        println!("No categories yet. Add one with `tabs categories add <NAME>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["ID", "Name", "Color", "Budget"]);
    for category in &all {
        table.add_row([
            category.id.to_string(),
            category.name.clone(),
            category.color.clone(),
            category
                .budget
                .map_or_else(|| "-".to_string(), |b| format!("{b:.2}")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn add(client: &ApiClient, name: &str, color: &str, budget: Option<f64>) -> Result<()> {
    validate_budget(budget)?;

    let category = categories::create(
        client,
        &NewCategory {
            name: name.to_string(),
            color: color.to_string(),
            budget,
        },
    )
    .await?;

    println!("Added category #{} ({}).", category.id, category.name);
    Ok(())
}

pub async fn edit(
    client: &ApiClient,
    id: u64,
    name: Option<String>,
    color: Option<String>,
    budget: Option<f64>,
    no_budget: bool,
) -> Result<()> {
    validate_budget(budget)?;

    let budget_patch = if no_budget {
        Some(None)
    } else {
        budget.map(Some)
    };

    let patch = CategoryPatch {
        name,
        color,
        budget: budget_patch,
    };
    if patch.name.is_none() && patch.color.is_none() && patch.budget.is_none() {
        return Err(ApiError::Validation("Nothing to update".to_string()).into());
    }

    let category = categories::update(client, id, &patch).await?;
    println!("Updated category #{}.", category.id);
    Ok(())
}

pub async fn delete(client: &ApiClient, id: u64, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete category #{id}?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    categories::delete(client, id).await?;
    println!("Deleted category #{id}.");
    Ok(())
}

fn validate_budget(budget: Option<f64>) -> Result<()> {
    if let Some(value) = budget
        && (!value.is_finite() || value <= 0.0)
    {
        return Err(ApiError::Validation("Budget must be a positive number".to_string()).into());
    }
    Ok(())
}
