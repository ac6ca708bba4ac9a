//! CSV file storage backend
//!
//! One file per collection under a data directory. Files are read with the
//! same leniency as the import boundary: cells are looked up by header name,
//! unknown columns are ignored, missing columns default, bad numbers coerce
//! to zero, and rows without a usable date are dropped with a warning. An
//! absent file is an empty collection.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::import::Sheet;
use crate::traits::LedgerStorage;
use crate::types::*;
use crate::utils::coerce;

const PURCHASES_FILE: &str = "purchases.csv";
const DEPOSITS_FILE: &str = "deposits.csv";
const DEBIT_NOTES_FILE: &str = "debit_notes.csv";
const SALES_FILE: &str = "sales.csv";
const EXPENSES_FILE: &str = "expenses.csv";

const PURCHASE_HEADERS: &[&str] = &[
    "sequence",
    "date",
    "supplier",
    "product",
    "unit_count",
    "outbound_kg",
    "returned_kg",
    "document_type",
    "crate_count",
    "unit_price",
    "average_lb",
    "net_kg",
    "net_lb",
    "total",
    "deposit_amount",
    "daily_movement",
    "cumulative_balance",
];

const DEPOSIT_HEADERS: &[&str] = &["sequence", "date", "counterparty", "agency", "amount", "kind"];

const DEBIT_NOTE_HEADERS: &[&str] = &[
    "id",
    "date",
    "computed_net_lb",
    "rate",
    "possible_discount",
    "actual_discount",
];

const SALE_HEADERS: &[&str] = &[
    "id",
    "date",
    "customer",
    "bird_type",
    "unit_count",
    "gross_lb",
    "discount_lb",
    "net_lb",
    "unit_price",
    "amount_due",
    "amount_paid",
    "balance_due",
];

const EXPENSE_HEADERS: &[&str] = &[
    "id",
    "date",
    "reference_amount",
    "description",
    "category",
    "amount",
];

fn persist(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Persistence(err.to_string())
}

fn parse_id(raw: &str) -> Uuid {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => id,
        Err(_) => {
            warn!(raw, "unusable record id, assigning a fresh one");
            Uuid::new_v4()
        }
    }
}

fn parse_kind(raw: &str) -> DepositKind {
    if raw.trim() == DepositKind::CashDeposit.as_str() {
        DepositKind::CashDeposit
    } else {
        DepositKind::Transfer
    }
}

/// Storage backend writing one CSV file per collection under a directory.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    dir: PathBuf,
}

impl CsvStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a file into a sheet; `None` when the file does not exist yet.
    fn read_sheet(&self, file: &str) -> LedgerResult<Option<Sheet>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(persist)?;
        let headers = reader
            .headers()
            .map_err(persist)?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(persist)?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Some(Sheet::new(file, headers, rows)))
    }

    fn write_rows(
        &self,
        file: &str,
        headers: &[&str],
        rows: impl Iterator<Item = Vec<String>>,
    ) -> LedgerResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(persist)?;
        let path = self.dir.join(file);
        let mut writer = csv::Writer::from_path(&path).map_err(persist)?;
        writer.write_record(headers).map_err(persist)?;
        for row in rows {
            writer.write_record(&row).map_err(persist)?;
        }
        writer.flush().map_err(persist)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStorage for CsvStorage {
    async fn load_purchases(&self) -> LedgerResult<Vec<PurchaseRecord>> {
        let sheet = match self.read_sheet(PURCHASES_FILE)? {
            Some(sheet) => sheet,
            None => return Ok(Vec::new()),
        };
        let mut records = Vec::new();
        for row in &sheet.rows {
            let date = match coerce::lenient_date(sheet.cell(row, "date")) {
                Some(date) => date,
                None => continue,
            };
            records.push(PurchaseRecord {
                sequence: sheet.cell(row, "sequence").trim().to_string(),
                date,
                supplier: sheet.cell(row, "supplier").trim().to_string(),
                product: sheet.cell(row, "product").trim().to_string(),
                unit_count: coerce::lenient_count(sheet.cell(row, "unit_count")),
                outbound_kg: coerce::lenient_amount(sheet.cell(row, "outbound_kg")),
                returned_kg: coerce::lenient_amount(sheet.cell(row, "returned_kg")),
                document_type: sheet.cell(row, "document_type").trim().to_string(),
                crate_count: coerce::lenient_count(sheet.cell(row, "crate_count")),
                unit_price: coerce::lenient_amount(sheet.cell(row, "unit_price")),
                average_lb: coerce::lenient_amount(sheet.cell(row, "average_lb")),
                net_kg: coerce::lenient_amount(sheet.cell(row, "net_kg")),
                net_lb: coerce::lenient_amount(sheet.cell(row, "net_lb")),
                total: coerce::lenient_amount(sheet.cell(row, "total")),
                deposit_amount: coerce::lenient_amount(sheet.cell(row, "deposit_amount")),
                daily_movement: coerce::lenient_amount(sheet.cell(row, "daily_movement")),
                cumulative_balance: coerce::lenient_amount(
                    sheet.cell(row, "cumulative_balance"),
                ),
            });
        }
        Ok(records)
    }

    async fn save_purchases(&mut self, records: &[PurchaseRecord]) -> LedgerResult<()> {
        self.write_rows(
            PURCHASES_FILE,
            PURCHASE_HEADERS,
            records.iter().map(|r| {
                vec![
                    r.sequence.clone(),
                    r.date.to_string(),
                    r.supplier.clone(),
                    r.product.clone(),
                    r.unit_count.to_string(),
                    r.outbound_kg.to_string(),
                    r.returned_kg.to_string(),
                    r.document_type.clone(),
                    r.crate_count.to_string(),
                    r.unit_price.to_string(),
                    r.average_lb.to_string(),
                    r.net_kg.to_string(),
                    r.net_lb.to_string(),
                    r.total.to_string(),
                    r.deposit_amount.to_string(),
                    r.daily_movement.to_string(),
                    r.cumulative_balance.to_string(),
                ]
            }),
        )
    }

    async fn load_deposits(&self) -> LedgerResult<Vec<DepositRecord>> {
        let sheet = match self.read_sheet(DEPOSITS_FILE)? {
            Some(sheet) => sheet,
            None => return Ok(Vec::new()),
        };
        let mut records = Vec::new();
        for row in &sheet.rows {
            let date = match coerce::lenient_date(sheet.cell(row, "date")) {
                Some(date) => date,
                None => continue,
            };
            records.push(DepositRecord {
                sequence: sheet.cell(row, "sequence").trim().to_string(),
                date,
                counterparty: sheet.cell(row, "counterparty").trim().to_string(),
                agency: sheet.cell(row, "agency").trim().to_string(),
                amount: coerce::lenient_amount(sheet.cell(row, "amount")),
                kind: parse_kind(sheet.cell(row, "kind")),
            });
        }
        Ok(records)
    }

    async fn save_deposits(&mut self, records: &[DepositRecord]) -> LedgerResult<()> {
        self.write_rows(
            DEPOSITS_FILE,
            DEPOSIT_HEADERS,
            records.iter().map(|r| {
                vec![
                    r.sequence.clone(),
                    r.date.to_string(),
                    r.counterparty.clone(),
                    r.agency.clone(),
                    r.amount.to_string(),
                    r.kind.as_str().to_string(),
                ]
            }),
        )
    }

    async fn load_debit_notes(&self) -> LedgerResult<Vec<DebitNoteRecord>> {
        let sheet = match self.read_sheet(DEBIT_NOTES_FILE)? {
            Some(sheet) => sheet,
            None => return Ok(Vec::new()),
        };
        let mut records = Vec::new();
        for row in &sheet.rows {
            let date = match coerce::lenient_date(sheet.cell(row, "date")) {
                Some(date) => date,
                None => continue,
            };
            records.push(DebitNoteRecord {
                id: parse_id(sheet.cell(row, "id")),
                date,
                computed_net_lb: coerce::lenient_amount(sheet.cell(row, "computed_net_lb")),
                rate: coerce::lenient_amount(sheet.cell(row, "rate")),
                possible_discount: coerce::lenient_amount(sheet.cell(row, "possible_discount")),
                actual_discount: coerce::lenient_amount(sheet.cell(row, "actual_discount")),
            });
        }
        Ok(records)
    }

    async fn save_debit_notes(&mut self, records: &[DebitNoteRecord]) -> LedgerResult<()> {
        self.write_rows(
            DEBIT_NOTES_FILE,
            DEBIT_NOTE_HEADERS,
            records.iter().map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.to_string(),
                    r.computed_net_lb.to_string(),
                    r.rate.to_string(),
                    r.possible_discount.to_string(),
                    r.actual_discount.to_string(),
                ]
            }),
        )
    }

    async fn load_sales(&self) -> LedgerResult<Vec<SaleRecord>> {
        let sheet = match self.read_sheet(SALES_FILE)? {
            Some(sheet) => sheet,
            None => return Ok(Vec::new()),
        };
        let mut records = Vec::new();
        for row in &sheet.rows {
            let date = match coerce::lenient_date(sheet.cell(row, "date")) {
                Some(date) => date,
                None => continue,
            };
            records.push(SaleRecord {
                id: parse_id(sheet.cell(row, "id")),
                date,
                customer: sheet.cell(row, "customer").trim().to_string(),
                bird_type: sheet.cell(row, "bird_type").trim().to_string(),
                unit_count: coerce::lenient_count(sheet.cell(row, "unit_count")),
                gross_lb: coerce::lenient_amount(sheet.cell(row, "gross_lb")),
                discount_lb: coerce::lenient_amount(sheet.cell(row, "discount_lb")),
                net_lb: coerce::lenient_amount(sheet.cell(row, "net_lb")),
                unit_price: coerce::lenient_amount(sheet.cell(row, "unit_price")),
                amount_due: coerce::lenient_amount(sheet.cell(row, "amount_due")),
                amount_paid: coerce::lenient_amount(sheet.cell(row, "amount_paid")),
                balance_due: coerce::lenient_amount(sheet.cell(row, "balance_due")),
            });
        }
        Ok(records)
    }

    async fn save_sales(&mut self, records: &[SaleRecord]) -> LedgerResult<()> {
        self.write_rows(
            SALES_FILE,
            SALE_HEADERS,
            records.iter().map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.to_string(),
                    r.customer.clone(),
                    r.bird_type.clone(),
                    r.unit_count.to_string(),
                    r.gross_lb.to_string(),
                    r.discount_lb.to_string(),
                    r.net_lb.to_string(),
                    r.unit_price.to_string(),
                    r.amount_due.to_string(),
                    r.amount_paid.to_string(),
                    r.balance_due.to_string(),
                ]
            }),
        )
    }

    async fn load_expenses(&self) -> LedgerResult<Vec<ExpenseRecord>> {
        let sheet = match self.read_sheet(EXPENSES_FILE)? {
            Some(sheet) => sheet,
            None => return Ok(Vec::new()),
        };
        let mut records = Vec::new();
        for row in &sheet.rows {
            let date = match coerce::lenient_date(sheet.cell(row, "date")) {
                Some(date) => date,
                None => continue,
            };
            records.push(ExpenseRecord {
                id: parse_id(sheet.cell(row, "id")),
                date,
                reference_amount: coerce::lenient_amount(sheet.cell(row, "reference_amount")),
                description: sheet.cell(row, "description").trim().to_string(),
                category: sheet.cell(row, "category").trim().to_string(),
                amount: coerce::lenient_amount(sheet.cell(row, "amount")),
            });
        }
        Ok(records)
    }

    async fn save_expenses(&mut self, records: &[ExpenseRecord]) -> LedgerResult<()> {
        self.write_rows(
            EXPENSES_FILE,
            EXPENSE_HEADERS,
            records.iter().map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.to_string(),
                    r.reference_amount.to_string(),
                    r.description.clone(),
                    r.category.clone(),
                    r.amount.to_string(),
                ]
            }),
        )
    }
}
