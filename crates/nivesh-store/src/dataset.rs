//! Mapping between canonical record types and Arrow tables.
//!
//! Column layouts match the original dataset files the presentation layer
//! reads: dates as ISO-8601 Utf8, money as Float64 (nullable where a parse
//! miss is legal), quantities as Int64. `Decimal` is converted at this
//! boundary only.

use crate::error::{StoreError, StoreResult};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use nivesh_core::{BulkBlockDeal, FlowRecord, InsiderTrade, Signal};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record type persisted as one Parquet dataset.
pub trait Dataset: Sized {
    /// File name within the data directory.
    const FILE_NAME: &'static str;

    /// Fixed column set for this dataset.
    fn schema() -> SchemaRef;

    /// Convert rows into one record batch of the declared schema.
    fn to_batch(rows: &[Self]) -> StoreResult<RecordBatch>;

    /// Convert a record batch back into rows.
    fn from_batch(batch: &RecordBatch) -> StoreResult<Vec<Self>>;
}

fn utf8(name: &str) -> Field {
    Field::new(name, DataType::Utf8, false)
}

fn f64_nullable(name: &str) -> Field {
    Field::new(name, DataType::Float64, true)
}

fn i64_col_field(name: &str) -> Field {
    Field::new(name, DataType::Int64, false)
}

fn dec_to_f64(value: &Decimal, field: &str) -> StoreResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| StoreError::Value(format!("{field}: {value} not representable as f64")))
}

fn opt_dec_to_f64(value: &Option<Decimal>, field: &str) -> StoreResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(d) => dec_to_f64(d, field).map(Some),
    }
}

fn str_col<'a>(batch: &'a RecordBatch, name: &str) -> StoreResult<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| StoreError::Schema(format!("missing or mistyped Utf8 column `{name}`")))
}

fn f64_col<'a>(batch: &'a RecordBatch, name: &str) -> StoreResult<&'a Float64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| StoreError::Schema(format!("missing or mistyped Float64 column `{name}`")))
}

fn i64_col<'a>(batch: &'a RecordBatch, name: &str) -> StoreResult<&'a Int64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or_else(|| StoreError::Schema(format!("missing or mistyped Int64 column `{name}`")))
}

fn parse_stored_date(raw: &str, name: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StoreError::Schema(format!("column `{name}`: bad date `{raw}`: {e}")))
}

/// Missing value (null or a NaN written by other tooling) maps to `None`.
fn opt_dec_at(arr: &Float64Array, i: usize) -> Option<Decimal> {
    if arr.is_null(i) {
        None
    } else {
        Decimal::from_f64(arr.value(i))
    }
}

fn dec_at(arr: &Float64Array, i: usize, name: &str) -> StoreResult<Decimal> {
    if arr.is_null(i) {
        return Err(StoreError::Schema(format!("column `{name}`: unexpected null")));
    }
    Decimal::from_f64(arr.value(i))
        .ok_or_else(|| StoreError::Value(format!("column `{name}`: non-finite value")))
}

impl Dataset for FlowRecord {
    const FILE_NAME: &'static str = "fii_dii_agg.parquet";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            utf8("date"),
            utf8("segment"),
            f64_nullable("fii_net_value_cr"),
            f64_nullable("dii_net_value_cr"),
            utf8("source"),
        ]))
    }

    fn to_batch(rows: &[Self]) -> StoreResult<RecordBatch> {
        let mut fii = Vec::with_capacity(rows.len());
        let mut dii = Vec::with_capacity(rows.len());
        for r in rows {
            fii.push(opt_dec_to_f64(&r.fii_net_value_cr, "fii_net_value_cr")?);
            dii.push(opt_dec_to_f64(&r.dii_net_value_cr, "dii_net_value_cr")?);
        }
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.date.format(DATE_FORMAT).to_string()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.segment.as_str()),
            )),
            Arc::new(Float64Array::from(fii)),
            Arc::new(Float64Array::from(dii)),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.source.as_str()),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> StoreResult<Vec<Self>> {
        let date = str_col(batch, "date")?;
        let segment = str_col(batch, "segment")?;
        let fii = f64_col(batch, "fii_net_value_cr")?;
        let dii = f64_col(batch, "dii_net_value_cr")?;
        let source = str_col(batch, "source")?;

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            rows.push(Self {
                date: parse_stored_date(date.value(i), "date")?,
                segment: segment.value(i).to_string(),
                fii_net_value_cr: opt_dec_at(fii, i),
                dii_net_value_cr: opt_dec_at(dii, i),
                source: source.value(i).to_string(),
            });
        }
        Ok(rows)
    }
}

impl Dataset for InsiderTrade {
    const FILE_NAME: &'static str = "insider_trades.parquet";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            utf8("date"),
            utf8("isin"),
            utf8("symbol"),
            utf8("person_name"),
            utf8("relation"),
            utf8("trade_type"),
            i64_col_field("qty"),
            f64_nullable("avg_price"),
            f64_nullable("value"),
            f64_nullable("post_holding_pct"),
            utf8("source_url"),
            utf8("raw_text"),
        ]))
    }

    fn to_batch(rows: &[Self]) -> StoreResult<RecordBatch> {
        let mut avg_price = Vec::with_capacity(rows.len());
        let mut value = Vec::with_capacity(rows.len());
        let mut post_holding = Vec::with_capacity(rows.len());
        for r in rows {
            avg_price.push(opt_dec_to_f64(&r.avg_price, "avg_price")?);
            value.push(opt_dec_to_f64(&r.value, "value")?);
            post_holding.push(opt_dec_to_f64(&r.post_holding_pct, "post_holding_pct")?);
        }
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.date.format(DATE_FORMAT).to_string()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.isin.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.symbol.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.person_name.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.relation.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.trade_type.as_str()),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.qty).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(avg_price)),
            Arc::new(Float64Array::from(value)),
            Arc::new(Float64Array::from(post_holding)),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.source_url.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.raw_text.as_str()),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> StoreResult<Vec<Self>> {
        let date = str_col(batch, "date")?;
        let isin = str_col(batch, "isin")?;
        let symbol = str_col(batch, "symbol")?;
        let person_name = str_col(batch, "person_name")?;
        let relation = str_col(batch, "relation")?;
        let trade_type = str_col(batch, "trade_type")?;
        let qty = i64_col(batch, "qty")?;
        let avg_price = f64_col(batch, "avg_price")?;
        let value = f64_col(batch, "value")?;
        let post_holding = f64_col(batch, "post_holding_pct")?;
        let source_url = str_col(batch, "source_url")?;
        let raw_text = str_col(batch, "raw_text")?;

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            rows.push(Self {
                date: parse_stored_date(date.value(i), "date")?,
                isin: isin.value(i).to_string(),
                symbol: symbol.value(i).to_string(),
                person_name: person_name.value(i).to_string(),
                relation: relation.value(i).to_string(),
                trade_type: trade_type.value(i).parse().map_err(|e| {
                    StoreError::Schema(format!("column `trade_type`: {e}"))
                })?,
                qty: qty.value(i),
                avg_price: opt_dec_at(avg_price, i),
                value: opt_dec_at(value, i),
                post_holding_pct: opt_dec_at(post_holding, i),
                source_url: source_url.value(i).to_string(),
                raw_text: raw_text.value(i).to_string(),
            });
        }
        Ok(rows)
    }
}

impl Dataset for BulkBlockDeal {
    const FILE_NAME: &'static str = "bulk_block.parquet";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            utf8("date"),
            utf8("isin"),
            utf8("symbol"),
            utf8("deal_type"),
            utf8("buyer_name"),
            utf8("seller_name"),
            i64_col_field("qty"),
            f64_nullable("avg_price"),
            f64_nullable("value"),
            utf8("source_url"),
        ]))
    }

    fn to_batch(rows: &[Self]) -> StoreResult<RecordBatch> {
        let mut avg_price = Vec::with_capacity(rows.len());
        let mut value = Vec::with_capacity(rows.len());
        for r in rows {
            avg_price.push(opt_dec_to_f64(&r.avg_price, "avg_price")?);
            value.push(opt_dec_to_f64(&r.value, "value")?);
        }
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.date.format(DATE_FORMAT).to_string()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.isin.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.symbol.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.deal_type.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.buyer_name.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.seller_name.as_str()),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.qty).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(avg_price)),
            Arc::new(Float64Array::from(value)),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.source_url.as_str()),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> StoreResult<Vec<Self>> {
        let date = str_col(batch, "date")?;
        let isin = str_col(batch, "isin")?;
        let symbol = str_col(batch, "symbol")?;
        let deal_type = str_col(batch, "deal_type")?;
        let buyer_name = str_col(batch, "buyer_name")?;
        let seller_name = str_col(batch, "seller_name")?;
        let qty = i64_col(batch, "qty")?;
        let avg_price = f64_col(batch, "avg_price")?;
        let value = f64_col(batch, "value")?;
        let source_url = str_col(batch, "source_url")?;

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            rows.push(Self {
                date: parse_stored_date(date.value(i), "date")?,
                isin: isin.value(i).to_string(),
                symbol: symbol.value(i).to_string(),
                deal_type: deal_type.value(i).parse().map_err(|e| {
                    StoreError::Schema(format!("column `deal_type`: {e}"))
                })?,
                buyer_name: buyer_name.value(i).to_string(),
                seller_name: seller_name.value(i).to_string(),
                qty: qty.value(i),
                avg_price: opt_dec_at(avg_price, i),
                value: opt_dec_at(value, i),
                source_url: source_url.value(i).to_string(),
            });
        }
        Ok(rows)
    }
}

impl Dataset for Signal {
    const FILE_NAME: &'static str = "signals.parquet";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            utf8("signal_date"),
            utf8("symbol"),
            utf8("signal_type"),
            Field::new("score", DataType::Float64, false),
            utf8("details_json"),
        ]))
    }

    fn to_batch(rows: &[Self]) -> StoreResult<RecordBatch> {
        let mut score = Vec::with_capacity(rows.len());
        for r in rows {
            score.push(dec_to_f64(&r.score, "score")?);
        }
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter()
                    .map(|r| r.signal_date.format(DATE_FORMAT).to_string()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.symbol.as_str()),
            )),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.signal_type.as_str()),
            )),
            Arc::new(Float64Array::from(score)),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.details_json.as_str()),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    fn from_batch(batch: &RecordBatch) -> StoreResult<Vec<Self>> {
        let signal_date = str_col(batch, "signal_date")?;
        let symbol = str_col(batch, "symbol")?;
        let signal_type = str_col(batch, "signal_type")?;
        let score = f64_col(batch, "score")?;
        let details_json = str_col(batch, "details_json")?;

        let mut rows = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            rows.push(Self {
                signal_date: parse_stored_date(signal_date.value(i), "signal_date")?,
                symbol: symbol.value(i).to_string(),
                signal_type: signal_type.value(i).to_string(),
                score: dec_at(score, i, "score")?,
                details_json: details_json.value(i).to_string(),
            });
        }
        Ok(rows)
    }
}
