// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binds a [`ChangeValue`] straight through `tokio_postgres`'s parameter
//! facility instead of converting through an intermediate string — the
//! "tagged dynamic value" the data model calls for.

use bytes::BytesMut;
use datasync_core::ChangeValue;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// Borrowed wrapper so a `&[ChangeValue]` slice can be passed directly as
/// `&[&dyn ToSql]` parameters without cloning into owned postgres types.
pub struct Param<'a>(pub &'a ChangeValue);

impl ToSql for Param<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self.0 {
            ChangeValue::Null => Ok(IsNull::Yes),
            ChangeValue::Bool(b) => b.to_sql(ty, out),
            ChangeValue::Int(i) => i.to_sql(ty, out),
            ChangeValue::Float(f) => f.to_sql(ty, out),
            ChangeValue::Timestamp(ts) => ts.to_sql(ty, out),
            ChangeValue::Text(s) => s.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}
