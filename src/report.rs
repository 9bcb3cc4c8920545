//! Tabular PDF rendering for the export endpoints: a title line, a bold
//! header row, and one row per record at fixed column offsets.

use axum::http::StatusCode;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::finance::progress_percent;
use crate::models::{Expense, Income, SavingGoal};
use crate::utils::format_date;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const TOP_OFFSET_MM: f32 = 20.0;
const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 10.0;
const ROW_STEP_MM: f32 = 6.0;

fn pdf_error<E: std::fmt::Display>(error: E) -> (StatusCode, String) {
    tracing::error!("report rendering failed: {error}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Report rendering failed".to_string(),
    )
}

fn render_table(
    title: &str,
    headers: &[&str],
    rows: Vec<Vec<String>>,
) -> Result<Vec<u8>, (StatusCode, String)> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let col_step = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / headers.len() as f32;
    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - TOP_OFFSET_MM;

    layer.use_text(title, TITLE_SIZE, Mm(MARGIN_MM), Mm(y), &bold);
    y -= 2.0 * ROW_STEP_MM;

    for (i, header) in headers.iter().enumerate() {
        layer.use_text(
            *header,
            BODY_SIZE,
            Mm(MARGIN_MM + col_step * i as f32),
            Mm(y),
            &bold,
        );
    }
    y -= ROW_STEP_MM;

    for row in rows {
        if y < MARGIN_MM {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT_MM - TOP_OFFSET_MM;
        }
        for (i, cell) in row.iter().enumerate() {
            layer.use_text(
                cell.as_str(),
                BODY_SIZE,
                Mm(MARGIN_MM + col_step * i as f32),
                Mm(y),
                &font,
            );
        }
        y -= ROW_STEP_MM;
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn text_or_dash(value: Option<&str>) -> String {
    match value {
        Some(text) => text.to_string(),
        None => "-".to_string(),
    }
}

pub fn expense_report(expenses: &[Expense]) -> Result<Vec<u8>, (StatusCode, String)> {
    let rows = expenses
        .iter()
        .map(|expense| {
            vec![
                format_date(expense.date),
                format!("{:.2}", expense.amount),
                expense.description.clone(),
                text_or_dash(expense.note.as_deref()),
            ]
        })
        .collect();

    render_table(
        "Expense Report",
        &["Date", "Amount", "Description", "Note"],
        rows,
    )
}

pub fn income_report(incomes: &[Income]) -> Result<Vec<u8>, (StatusCode, String)> {
    let rows = incomes
        .iter()
        .map(|income| {
            vec![
                format_date(income.date),
                format!("{:.2}", income.amount),
                text_or_dash(income.source.as_deref()),
                text_or_dash(income.note.as_deref()),
            ]
        })
        .collect();

    render_table("Income Report", &["Date", "Amount", "Source", "Note"], rows)
}

pub fn saving_report(goals: &[SavingGoal]) -> Result<Vec<u8>, (StatusCode, String)> {
    let rows = goals
        .iter()
        .map(|goal| {
            vec![
                goal.title.clone(),
                goal.target_amount
                    .map(|target| format!("{:.2}", target))
                    .unwrap_or_else(|| "-".to_string()),
                format!("{:.2}", goal.current_amount),
                progress_percent(goal.target_amount, goal.current_amount)
                    .map(|percent| format!("{}%", percent))
                    .unwrap_or_else(|| "-".to_string()),
                goal.deadline
                    .map(format_date)
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    render_table(
        "Saving Goals Report",
        &["Title", "Target", "Current", "Progress", "Deadline"],
        rows,
    )
}
