//! Bulk import of tabular data into the record store
//!
//! Sheets arrive as loosely structured string grids (spreadsheet exports,
//! hand-edited CSV). Parsing is lenient per cell: bad numbers coerce to
//! zero, rows without a usable date are dropped, and a sheet missing a
//! required column is skipped whole while the rest of the batch proceeds.
//! Every outcome is tallied in the [`ImportReport`].

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::ledger::{debit_notes, deposits, purchases};
use crate::sales;
use crate::types::*;
use crate::utils::coerce;

/// Required columns for a purchase sheet.
pub const PURCHASE_COLUMNS: &[&str] = &[
    "date",
    "supplier",
    "unit_count",
    "outbound_kg",
    "returned_kg",
    "document_type",
    "crate_count",
    "unit_price",
];

/// Required columns for a deposit sheet.
pub const DEPOSIT_COLUMNS: &[&str] = &["date", "counterparty", "agency", "amount"];

/// Required columns for a debit-note sheet.
pub const DEBIT_NOTE_COLUMNS: &[&str] = &["date", "rate", "actual_discount"];

/// Required columns for a sales sheet.
pub const SALE_COLUMNS: &[&str] = &[
    "date",
    "customer",
    "bird_type",
    "unit_count",
    "gross_lb",
    "discount_lb",
    "unit_price",
    "amount_paid",
];

/// Required columns for an expense sheet.
pub const EXPENSE_COLUMNS: &[&str] = &[
    "date",
    "reference_amount",
    "description",
    "category",
    "amount",
];

/// One tabular sheet: a header row plus string cells. Unknown columns are
/// ignored; lookup is by header name, not position.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.column(name)
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }

    fn require(&self, required: &[&str]) -> LedgerResult<()> {
        let missing = self.missing_columns(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Schema {
                sheet: self.name.clone(),
                missing: missing.join(", "),
            })
        }
    }
}

/// One batch of sheets to import. Absent sheets are simply not imported.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub purchases: Option<Sheet>,
    pub deposits: Option<Sheet>,
    pub debit_notes: Option<Sheet>,
    pub sales: Option<Sheet>,
    pub expenses: Option<Sheet>,
}

/// Tally of what a batch import did.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub purchases_added: usize,
    pub deposits_added: usize,
    pub debit_notes_added: usize,
    pub sales_added: usize,
    pub expenses_added: usize,
    /// Sale/expense rows skipped because an identical record already exists
    pub duplicates_skipped: usize,
    /// Rows dropped for an unusable date
    pub rows_dropped: usize,
    /// Sheets skipped whole for missing required columns
    pub schema_issues: Vec<LedgerError>,
}

fn key_amount(value: &BigDecimal) -> String {
    value.normalized().to_string()
}

fn sale_key(sale: &SaleRecord) -> (String, String, String, i64, String, String) {
    (
        sale.date.to_string(),
        sale.customer.clone(),
        sale.bird_type.clone(),
        sale.unit_count,
        key_amount(&sale.gross_lb),
        key_amount(&sale.unit_price),
    )
}

fn expense_key(expense: &ExpenseRecord) -> (String, String, String) {
    (
        expense.date.to_string(),
        expense.category.clone(),
        key_amount(&expense.amount),
    )
}

/// Apply a batch to the five collections in place, returning the tally.
///
/// Purchases and deposits are appended with sequences continuing from the
/// existing maximum. Debit-note weight snapshots are taken against the
/// purchase collection as it stood before the batch. Sales and expenses
/// dedupe against existing records, existing wins.
pub fn apply_batch(
    batch: &ImportBatch,
    purchase_rows: &mut Vec<PurchaseRecord>,
    deposit_rows: &mut Vec<DepositRecord>,
    note_rows: &mut Vec<DebitNoteRecord>,
    sale_rows: &mut Vec<SaleRecord>,
    expense_rows: &mut Vec<ExpenseRecord>,
    config: &LedgerConfig,
) -> ImportReport {
    let mut report = ImportReport::default();
    let pre_import_purchases = purchase_rows.clone();

    if let Some(sheet) = &batch.purchases {
        match sheet.require(PURCHASE_COLUMNS) {
            Ok(()) => import_purchases(sheet, purchase_rows, config, &mut report),
            Err(issue) => report.schema_issues.push(issue),
        }
    }
    if let Some(sheet) = &batch.deposits {
        match sheet.require(DEPOSIT_COLUMNS) {
            Ok(()) => import_deposits(sheet, deposit_rows, config, &mut report),
            Err(issue) => report.schema_issues.push(issue),
        }
    }
    if let Some(sheet) = &batch.debit_notes {
        match sheet.require(DEBIT_NOTE_COLUMNS) {
            Ok(()) => import_notes(sheet, note_rows, &pre_import_purchases, &mut report),
            Err(issue) => report.schema_issues.push(issue),
        }
    }
    if let Some(sheet) = &batch.sales {
        match sheet.require(SALE_COLUMNS) {
            Ok(()) => import_sales(sheet, sale_rows, &mut report),
            Err(issue) => report.schema_issues.push(issue),
        }
    }
    if let Some(sheet) = &batch.expenses {
        match sheet.require(EXPENSE_COLUMNS) {
            Ok(()) => import_expenses(sheet, expense_rows, &mut report),
            Err(issue) => report.schema_issues.push(issue),
        }
    }
    report
}

fn import_purchases(
    sheet: &Sheet,
    rows: &mut Vec<PurchaseRecord>,
    config: &LedgerConfig,
    report: &mut ImportReport,
) {
    for raw in &sheet.rows {
        let date = match coerce::lenient_date(sheet.cell(raw, "date")) {
            Some(date) => date,
            None => {
                report.rows_dropped += 1;
                continue;
            }
        };
        let input = PurchaseInput {
            date,
            supplier: sheet.cell(raw, "supplier").trim().to_string(),
            unit_count: coerce::lenient_count(sheet.cell(raw, "unit_count")),
            outbound_kg: coerce::lenient_amount(sheet.cell(raw, "outbound_kg")),
            returned_kg: coerce::lenient_amount(sheet.cell(raw, "returned_kg")),
            document_type: sheet.cell(raw, "document_type").trim().to_string(),
            crate_count: coerce::lenient_count(sheet.cell(raw, "crate_count")),
            unit_price: coerce::lenient_amount(sheet.cell(raw, "unit_price")),
        };
        let sequence = purchases::next_sequence(rows);
        rows.push(purchases::build_record(sequence, &input, config));
        report.purchases_added += 1;
    }
}

fn import_deposits(
    sheet: &Sheet,
    rows: &mut Vec<DepositRecord>,
    config: &LedgerConfig,
    report: &mut ImportReport,
) {
    for raw in &sheet.rows {
        let date = match coerce::lenient_date(sheet.cell(raw, "date")) {
            Some(date) => date,
            None => {
                report.rows_dropped += 1;
                continue;
            }
        };
        let input = DepositInput {
            date,
            counterparty: sheet.cell(raw, "counterparty").trim().to_string(),
            agency: sheet.cell(raw, "agency").trim().to_string(),
            amount: coerce::lenient_amount(sheet.cell(raw, "amount")),
        };
        let sequence = deposits::next_sequence(rows);
        rows.push(deposits::build_record(sequence, &input, config));
        report.deposits_added += 1;
    }
}

fn import_notes(
    sheet: &Sheet,
    rows: &mut Vec<DebitNoteRecord>,
    pre_import_purchases: &[PurchaseRecord],
    report: &mut ImportReport,
) {
    for raw in &sheet.rows {
        let date = match coerce::lenient_date(sheet.cell(raw, "date")) {
            Some(date) => date,
            None => {
                report.rows_dropped += 1;
                continue;
            }
        };
        let input = DebitNoteInput {
            date,
            rate: coerce::lenient_amount(sheet.cell(raw, "rate")),
            actual_discount: coerce::lenient_amount(sheet.cell(raw, "actual_discount")),
        };
        rows.push(debit_notes::build_record(
            Uuid::new_v4(),
            &input,
            pre_import_purchases,
        ));
        report.debit_notes_added += 1;
    }
}

fn import_sales(sheet: &Sheet, rows: &mut Vec<SaleRecord>, report: &mut ImportReport) {
    let mut seen: Vec<_> = rows.iter().map(sale_key).collect();
    for raw in &sheet.rows {
        let date = match coerce::lenient_date(sheet.cell(raw, "date")) {
            Some(date) => date,
            None => {
                report.rows_dropped += 1;
                continue;
            }
        };
        let input = SaleInput {
            date,
            customer: sheet.cell(raw, "customer").trim().to_string(),
            bird_type: sheet.cell(raw, "bird_type").trim().to_string(),
            unit_count: coerce::lenient_count(sheet.cell(raw, "unit_count")),
            gross_lb: coerce::lenient_amount(sheet.cell(raw, "gross_lb")),
            discount_lb: coerce::lenient_amount(sheet.cell(raw, "discount_lb")),
            unit_price: coerce::lenient_amount(sheet.cell(raw, "unit_price")),
            amount_paid: coerce::lenient_amount(sheet.cell(raw, "amount_paid")),
        };
        let candidate = sales::build_sale(Uuid::new_v4(), &input);
        let key = sale_key(&candidate);
        if seen.contains(&key) {
            report.duplicates_skipped += 1;
            continue;
        }
        seen.push(key);
        rows.push(candidate);
        report.sales_added += 1;
    }
}

fn import_expenses(sheet: &Sheet, rows: &mut Vec<ExpenseRecord>, report: &mut ImportReport) {
    let mut seen: Vec<_> = rows.iter().map(expense_key).collect();
    for raw in &sheet.rows {
        let date = match coerce::lenient_date(sheet.cell(raw, "date")) {
            Some(date) => date,
            None => {
                report.rows_dropped += 1;
                continue;
            }
        };
        let input = ExpenseInput {
            date,
            reference_amount: coerce::lenient_amount(sheet.cell(raw, "reference_amount")),
            description: sheet.cell(raw, "description").trim().to_string(),
            category: sheet.cell(raw, "category").trim().to_string(),
            amount: coerce::lenient_amount(sheet.cell(raw, "amount")),
        };
        let candidate = sales::build_expense(Uuid::new_v4(), &input);
        let key = expense_key(&candidate);
        if seen.contains(&key) {
            report.duplicates_skipped += 1;
            continue;
        }
        seen.push(key);
        rows.push(candidate);
        report.expenses_added += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn purchase_sheet(rows: Vec<Vec<String>>) -> Sheet {
        Sheet::new("purchases", strings(PURCHASE_COLUMNS), rows)
    }

    fn sale_sheet(rows: Vec<Vec<String>>) -> Sheet {
        Sheet::new("sales", strings(SALE_COLUMNS), rows)
    }

    #[test]
    fn purchases_continue_the_existing_sequence() {
        let config = LedgerConfig::default();
        let mut purchase_rows = vec![purchases::build_record(
            "05".to_string(),
            &PurchaseInput {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                supplier: "LIRIS SA".to_string(),
                unit_count: 10,
                outbound_kg: BigDecimal::from(100),
                returned_kg: BigDecimal::from(0),
                document_type: "Invoice".to_string(),
                crate_count: 4,
                unit_price: BigDecimal::from(1),
            },
            &config,
        )];
        let batch = ImportBatch {
            purchases: Some(purchase_sheet(vec![
                strings(&["2024-03-02", "LIRIS SA", "8", "90", "10", "Invoice", "3", "1.1"]),
                strings(&["2024-03-03", "Medina", "5", "50", "0", "Receipt", "2", "0.9"]),
            ])),
            ..Default::default()
        };
        let report = apply_batch(
            &batch,
            &mut purchase_rows,
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &config,
        );
        assert_eq!(report.purchases_added, 2);
        assert_eq!(purchase_rows[1].sequence, "06");
        assert_eq!(purchase_rows[2].sequence, "07");
        assert_eq!(purchase_rows[1].net_kg, BigDecimal::from(80));
    }

    #[test]
    fn missing_columns_skip_the_sheet_but_not_the_batch() {
        let config = LedgerConfig::default();
        let broken = Sheet::new(
            "purchases",
            strings(&["date", "supplier"]),
            vec![strings(&["2024-03-01", "LIRIS SA"])],
        );
        let batch = ImportBatch {
            purchases: Some(broken),
            deposits: Some(Sheet::new(
                "deposits",
                strings(DEPOSIT_COLUMNS),
                vec![strings(&["2024-03-01", "LIRIS SA", "Banco Pichincha", "200"])],
            )),
            ..Default::default()
        };
        let mut purchase_rows = Vec::new();
        let mut deposit_rows = Vec::new();
        let report = apply_batch(
            &batch,
            &mut purchase_rows,
            &mut deposit_rows,
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &config,
        );
        assert_eq!(report.schema_issues.len(), 1);
        assert!(matches!(report.schema_issues[0], LedgerError::Schema { .. }));
        assert!(purchase_rows.is_empty());
        assert_eq!(report.deposits_added, 1);
        assert_eq!(deposit_rows[0].amount, BigDecimal::from(200));
    }

    #[test]
    fn unusable_dates_drop_the_row() {
        let config = LedgerConfig::default();
        let batch = ImportBatch {
            purchases: Some(purchase_sheet(vec![
                strings(&["not a date", "LIRIS SA", "8", "90", "10", "Invoice", "3", "1.1"]),
                strings(&["2024-03-02", "LIRIS SA", "8", "90", "10", "Invoice", "3", "1.1"]),
            ])),
            ..Default::default()
        };
        let mut purchase_rows = Vec::new();
        let report = apply_batch(
            &batch,
            &mut purchase_rows,
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &config,
        );
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(report.purchases_added, 1);
    }

    #[test]
    fn duplicate_sales_keep_the_existing_record() {
        let config = LedgerConfig::default();
        let existing = sales::build_sale(
            Uuid::new_v4(),
            &SaleInput {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                customer: "Maria".to_string(),
                bird_type: "Broiler".to_string(),
                unit_count: 2,
                gross_lb: BigDecimal::from(8),
                discount_lb: BigDecimal::from(0),
                unit_price: BigDecimal::from(1),
                amount_paid: BigDecimal::from(8),
            },
        );
        let existing_id = existing.id;
        let mut sale_rows = vec![existing];
        let batch = ImportBatch {
            sales: Some(sale_sheet(vec![
                // same identity with different formatting still collides
                strings(&["2024-03-01", "Maria", "Broiler", "2", "8.0", "0", "1.00", "0"]),
                strings(&["2024-03-02", "Maria", "Broiler", "2", "8", "0", "1", "0"]),
            ])),
            ..Default::default()
        };
        let report = apply_batch(
            &batch,
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &mut sale_rows,
            &mut Vec::new(),
            &config,
        );
        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(report.sales_added, 1);
        assert_eq!(sale_rows.len(), 2);
        assert_eq!(sale_rows[0].id, existing_id);
    }

    #[test]
    fn note_snapshots_use_pre_import_purchases() {
        let config = LedgerConfig::default();
        let mut purchase_rows = Vec::new();
        let batch = ImportBatch {
            purchases: Some(purchase_sheet(vec![strings(&[
                "2024-03-01", "LIRIS SA", "8", "90", "10", "Invoice", "3", "1.1",
            ])])),
            debit_notes: Some(Sheet::new(
                "debit_notes",
                strings(DEBIT_NOTE_COLUMNS),
                vec![strings(&["2024-03-01", "0.1", "5"])],
            )),
            ..Default::default()
        };
        let mut note_rows = Vec::new();
        apply_batch(
            &batch,
            &mut purchase_rows,
            &mut Vec::new(),
            &mut note_rows,
            &mut Vec::new(),
            &mut Vec::new(),
            &config,
        );
        // the purchase landed in the same batch, so the snapshot sees nothing
        assert_eq!(note_rows[0].computed_net_lb, BigDecimal::from(0));
        assert_eq!(note_rows[0].actual_discount, BigDecimal::from(5));
        assert_eq!(purchase_rows.len(), 1);
    }

    #[test]
    fn lenient_cells_coerce_instead_of_failing() {
        let config = LedgerConfig::default();
        let batch = ImportBatch {
            purchases: Some(purchase_sheet(vec![strings(&[
                "2024-03-01",
                "LIRIS SA",
                "8.0",
                "$1,090.00",
                "junk",
                "Invoice",
                "",
                "1.1",
            ])])),
            ..Default::default()
        };
        let mut purchase_rows = Vec::new();
        apply_batch(
            &batch,
            &mut purchase_rows,
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &mut Vec::new(),
            &config,
        );
        let row = &purchase_rows[0];
        assert_eq!(row.unit_count, 8);
        assert_eq!(row.outbound_kg, BigDecimal::from(1090));
        assert_eq!(row.returned_kg, BigDecimal::from(0));
        assert_eq!(row.crate_count, 0);
    }
}
