//! Expense list and CRUD handlers.

use std::str::FromStr;

use anyhow::Result;
use comfy_table::{ContentArrangement, Table};
use tabs_client::api::expenses::{self, Expense, ExpensePatch, ExpenseQuery, NewExpense, SortOrder};
use tabs_client::client::ApiClient;
use tabs_client::error::ApiError;

use super::{confirm, parse_amount, parse_date};

pub async fn list(
    client: &ApiClient,
    page: u32,
    category: Option<String>,
    sort: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let query = ExpenseQuery {
        page: Some(page),
        category,
        ordering: sort.as_deref().map(SortOrder::from_str).transpose()?,
        date_from: from.as_deref().map(parse_date).transpose()?,
        date_to: to.as_deref().map(parse_date).transpose()?,
    };

    let result = expenses::list(client, &query).await?;

    if result.results.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["ID", "Date", "Category", "Amount", "Description"]);
    for expense in &result.results {
        table.add_row([
            expense.id.to_string(),
            expense.date.to_string(),
            expense.category.clone(),
            expense.amount.clone(),
            expense.description.clone(),
        ]);
    }
    println!("{table}");
    println!("Page {page} of {}", result.total_pages.max(1));
    Ok(())
}

pub async fn show(client: &ApiClient, id: u64) -> Result<()> {
    let expense = expenses::get(client, id).await?;
    print_expense(&expense);
    Ok(())
}

pub async fn add(
    client: &ApiClient,
    amount: &str,
    category: &str,
    description: Option<String>,
    date: &str,
) -> Result<()> {
    if category.trim().is_empty() {
        return Err(ApiError::Validation("Category is required".to_string()).into());
    }

    let expense = expenses::create(
        client,
        &NewExpense {
            amount: parse_amount(amount)?,
            category: category.to_string(),
            // Matches the web form's fallback for an empty description.
            description: description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| "No description".to_string()),
            date: parse_date(date)?,
        },
    )
    .await?;

    println!("Added expense #{}.", expense.id);
    Ok(())
}

pub async fn edit(
    client: &ApiClient,
    id: u64,
    amount: Option<String>,
    category: Option<String>,
    description: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let patch = ExpensePatch {
        amount: amount.as_deref().map(parse_amount).transpose()?,
        category,
        description,
        date: date.as_deref().map(parse_date).transpose()?,
    };

    if patch.amount.is_none()
        && patch.category.is_none()
        && patch.description.is_none()
        && patch.date.is_none()
    {
        return Err(ApiError::Validation("Nothing to update".to_string()).into());
    }

    let expense = expenses::update(client, id, &patch).await?;
    println!("Updated expense #{}.", expense.id);
    Ok(())
}

pub async fn delete(client: &ApiClient, id: u64, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete expense #{id}?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    expenses::delete(client, id).await?;
    println!("Deleted expense #{id}.");
    Ok(())
}

fn print_expense(expense: &Expense) {
    println!("Expense #{}", expense.id);
    println!("  Date:        {}", expense.date);
    println!("  Category:    {}", expense.category);
    println!("  Amount:      {}", expense.amount);
    println!("  Description: {}", expense.description);
}
