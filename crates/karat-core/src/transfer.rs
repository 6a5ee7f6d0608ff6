//! # Stock Transfer Module
//!
//! Request types, the forward-only status machine and the destination
//! resolution that decides where transferred stock lands.
//!
//! ## Status Machine
//! ```text
//!   1 Pending ──► 2 Dispatched ──► 3 Delivered (terminal)
//!                  needs dispatch_date   needs delivery_date
//!
//!   No skipping (1 → 3), no regressing (2 → 1), nothing after 3.
//! ```
//!
//! ## Destination Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock_locations (sku, branch_id) UNIQUE                               │
//! │                                                                         │
//! │  row found     ──► Merge { product, item }   quantity += n             │
//! │  no row        ──► Clone                     new product + item        │
//! │                                              quantity  = n             │
//! │                                              location row inserted     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{
    StockTransfer, StockTransferItem, StockTransferStatusHistory, StockTransferTracking,
    TransferStatus,
};
use crate::validation::{
    validate_document_no, validate_line_count, validate_optional_text, validate_quantity,
    validate_required,
};

// =============================================================================
// Create Request
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferItemInput {
    pub product_id: String,
    pub product_item_detail_id: String,
    pub transfer_quantity: i64,
}

/// Body of a create-transfer request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferRequest {
    /// Generated from the `ST` fiscal series when omitted.
    #[serde(default)]
    pub transfer_no: Option<String>,
    #[ts(as = "String")]
    pub transfer_date: NaiveDate,
    pub branch_from: String,
    pub branch_to: String,
    #[serde(default)]
    pub remarks: Option<String>,
    pub items: Vec<TransferItemInput>,
}

impl TransferRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyItems {
                document: "Stock transfer".to_string(),
            });
        }
        validate_line_count("items", self.items.len())?;

        if let Some(no) = &self.transfer_no {
            validate_document_no("transfer_no", no)?;
        }
        validate_required("branch_from", &self.branch_from)?;
        validate_required("branch_to", &self.branch_to)?;
        if self.branch_from == self.branch_to {
            return Err(CoreError::SameBranch {
                branch_id: self.branch_from.clone(),
            });
        }
        validate_optional_text("remarks", self.remarks.as_deref(), 500)?;

        for item in &self.items {
            validate_required("product_id", &item.product_id)?;
            validate_required("product_item_detail_id", &item.product_item_detail_id)?;
            validate_quantity("transfer_quantity", item.transfer_quantity)?;
        }

        Ok(())
    }

    /// Groups request lines by source product, keeping first-seen order.
    ///
    /// Each group shares one cloned destination product.
    pub fn product_groups(&self) -> Vec<(String, Vec<usize>)> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            match groups.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, indexes)) => indexes.push(index),
                None => groups.push((item.product_id.clone(), vec![index])),
            }
        }
        groups
    }
}

/// A transfer with its resolved lines, current tracking and status timeline.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferBundle {
    pub transfer: StockTransfer,
    pub items: Vec<StockTransferItem>,
    pub tracking: Option<StockTransferTracking>,
    /// Status history, oldest first.
    pub timeline: Vec<StockTransferStatusHistory>,
}

// =============================================================================
// Status Update
// =============================================================================

/// Body of a status update. `status_id` stays numeric so an unknown value
/// is reported as a validation failure rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusUpdateRequest {
    pub status_id: i32,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub dispatch_date: Option<NaiveDate>,
    #[serde(default)]
    pub dispatched_by: Option<String>,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub dispatch_remarks: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub received_by: Option<String>,
    #[serde(default)]
    pub delivery_remarks: Option<String>,
}

/// What a valid status update writes to the tracking projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingChange {
    /// Creates the tracking row.
    Dispatch {
        dispatch_date: NaiveDate,
        dispatched_by: Option<String>,
        vehicle_no: Option<String>,
        remarks: Option<String>,
    },
    /// Extends the tracking row in place.
    Delivery {
        delivery_date: NaiveDate,
        received_by: Option<String>,
        remarks: Option<String>,
    },
}

impl TrackingChange {
    pub fn status(&self) -> TransferStatus {
        match self {
            TrackingChange::Dispatch { .. } => TransferStatus::Dispatched,
            TrackingChange::Delivery { .. } => TransferStatus::Delivered,
        }
    }
}

/// Checks a requested move against the current status.
pub fn check_transition(current: TransferStatus, requested: i32) -> CoreResult<TransferStatus> {
    let requested = TransferStatus::try_from(requested)?;
    match current.successor() {
        Some(next) if next == requested => Ok(next),
        _ => Err(CoreError::InvalidStatusTransition {
            document: "stock transfer".to_string(),
            from: current.as_str().to_string(),
            to: requested.as_str().to_string(),
        }),
    }
}

impl StatusUpdateRequest {
    /// Validates the update and derives the tracking change it implies.
    ///
    /// `dispatched_on` is the dispatch date already on record; a delivery
    /// may not predate it.
    pub fn plan(
        &self,
        current: TransferStatus,
        dispatched_on: Option<NaiveDate>,
    ) -> CoreResult<TrackingChange> {
        let next = check_transition(current, self.status_id)?;
        validate_optional_text("dispatched_by", self.dispatched_by.as_deref(), 100)?;
        validate_optional_text("vehicle_no", self.vehicle_no.as_deref(), 30)?;
        validate_optional_text("received_by", self.received_by.as_deref(), 100)?;

        match next {
            TransferStatus::Dispatched => {
                let dispatch_date = self.dispatch_date.ok_or_else(|| {
                    CoreError::MissingStatusDate {
                        field: "dispatch_date".to_string(),
                        status: next.as_str().to_string(),
                    }
                })?;
                Ok(TrackingChange::Dispatch {
                    dispatch_date,
                    dispatched_by: self.dispatched_by.clone(),
                    vehicle_no: self.vehicle_no.clone(),
                    remarks: self.dispatch_remarks.clone(),
                })
            }
            TransferStatus::Delivered => {
                let delivery_date = self.delivery_date.ok_or_else(|| {
                    CoreError::MissingStatusDate {
                        field: "delivery_date".to_string(),
                        status: next.as_str().to_string(),
                    }
                })?;
                if let Some(dispatched) = dispatched_on {
                    if delivery_date < dispatched {
                        return Err(ValidationError::InvalidFormat {
                            field: "delivery_date".to_string(),
                            reason: format!("must not be before dispatch date {dispatched}"),
                        }
                        .into());
                    }
                }
                Ok(TrackingChange::Delivery {
                    delivery_date,
                    received_by: self.received_by.clone(),
                    remarks: self.delivery_remarks.clone(),
                })
            }
            // check_transition never yields the initial status
            TransferStatus::Pending => Err(CoreError::InvalidStatusTransition {
                document: "stock transfer".to_string(),
                from: current.as_str().to_string(),
                to: next.as_str().to_string(),
            }),
        }
    }
}

/// Audit note written with each status history row.
pub fn history_note(status: TransferStatus) -> &'static str {
    match status {
        TransferStatus::Pending => "Created",
        TransferStatus::Dispatched => "Dispatched",
        TransferStatus::Delivered => "Delivered",
    }
}

// =============================================================================
// Destination Resolution
// =============================================================================

/// A transfer-created stock record at a branch, unique per `(sku, branch)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLocation {
    pub id: String,
    pub sku: String,
    pub branch_id: String,
    pub product_id: String,
    pub product_item_detail_id: String,
}

/// Where one transferred line lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum DestinationResolution {
    /// Add to an item that an earlier transfer created at the destination.
    Merge {
        product_id: String,
        product_item_detail_id: String,
    },
    /// No such item yet; create one.
    Clone,
}

impl DestinationResolution {
    pub fn from_location(location: Option<&StockLocation>) -> Self {
        match location {
            Some(loc) => DestinationResolution::Merge {
                product_id: loc.product_id.clone(),
                product_item_detail_id: loc.product_item_detail_id.clone(),
            },
            None => DestinationResolution::Clone,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationResolution::Merge { .. } => "merge",
            DestinationResolution::Clone => "clone",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn request() -> TransferRequest {
        TransferRequest {
            transfer_no: Some("ST-1".to_string()),
            transfer_date: date(1),
            branch_from: "b1".to_string(),
            branch_to: "b2".to_string(),
            remarks: None,
            items: vec![
                TransferItemInput {
                    product_id: "p1".to_string(),
                    product_item_detail_id: "i1".to_string(),
                    transfer_quantity: 2,
                },
                TransferItemInput {
                    product_id: "p2".to_string(),
                    product_item_detail_id: "i2".to_string(),
                    transfer_quantity: 1,
                },
                TransferItemInput {
                    product_id: "p1".to_string(),
                    product_item_detail_id: "i3".to_string(),
                    transfer_quantity: 4,
                },
            ],
        }
    }

    #[test]
    fn test_validate_transfer_request() {
        assert!(request().validate().is_ok());

        let mut r = request();
        r.branch_to = "b1".to_string();
        assert!(matches!(r.validate(), Err(CoreError::SameBranch { .. })));

        let mut r = request();
        r.items.clear();
        assert!(matches!(r.validate(), Err(CoreError::EmptyItems { .. })));

        let mut r = request();
        r.items[0].transfer_quantity = 0;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_product_groups_keep_first_seen_order() {
        let groups = request().product_groups();
        assert_eq!(
            groups,
            vec![
                ("p1".to_string(), vec![0, 2]),
                ("p2".to_string(), vec![1]),
            ]
        );
    }

    #[test]
    fn test_transitions_move_one_step_forward() {
        assert_eq!(
            check_transition(TransferStatus::Pending, 2).unwrap(),
            TransferStatus::Dispatched
        );
        assert_eq!(
            check_transition(TransferStatus::Dispatched, 3).unwrap(),
            TransferStatus::Delivered
        );

        // skip, regress, repeat, terminal, unknown
        assert!(check_transition(TransferStatus::Pending, 3).is_err());
        assert!(check_transition(TransferStatus::Dispatched, 1).is_err());
        assert!(check_transition(TransferStatus::Dispatched, 2).is_err());
        assert!(check_transition(TransferStatus::Delivered, 3).is_err());
        assert!(matches!(
            check_transition(TransferStatus::Pending, 7),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_dispatch_requires_date() {
        let update = StatusUpdateRequest {
            status_id: 2,
            ..Default::default()
        };
        assert!(matches!(
            update.plan(TransferStatus::Pending, None),
            Err(CoreError::MissingStatusDate { .. })
        ));

        let update = StatusUpdateRequest {
            status_id: 2,
            dispatch_date: Some(date(2)),
            vehicle_no: Some("KA-01-1234".to_string()),
            ..Default::default()
        };
        let change = update.plan(TransferStatus::Pending, None).unwrap();
        assert_eq!(change.status(), TransferStatus::Dispatched);
        assert!(matches!(change, TrackingChange::Dispatch { .. }));
    }

    #[test]
    fn test_delivery_requires_date_not_before_dispatch() {
        let update = StatusUpdateRequest {
            status_id: 3,
            ..Default::default()
        };
        assert!(matches!(
            update.plan(TransferStatus::Dispatched, Some(date(2))),
            Err(CoreError::MissingStatusDate { .. })
        ));

        let early = StatusUpdateRequest {
            status_id: 3,
            delivery_date: Some(date(1)),
            ..Default::default()
        };
        assert!(early.plan(TransferStatus::Dispatched, Some(date(2))).is_err());

        let ok = StatusUpdateRequest {
            status_id: 3,
            delivery_date: Some(date(2)),
            received_by: Some("Store manager".to_string()),
            ..Default::default()
        };
        let change = ok.plan(TransferStatus::Dispatched, Some(date(2))).unwrap();
        assert_eq!(change.status(), TransferStatus::Delivered);
    }

    #[test]
    fn test_destination_resolution() {
        assert_eq!(
            DestinationResolution::from_location(None),
            DestinationResolution::Clone
        );

        let loc = StockLocation {
            id: "l1".to_string(),
            sku: "RING-22K".to_string(),
            branch_id: "b2".to_string(),
            product_id: "p9".to_string(),
            product_item_detail_id: "i9".to_string(),
        };
        let resolution = DestinationResolution::from_location(Some(&loc));
        assert_eq!(resolution.as_str(), "merge");
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["resolution"], "merge");
        assert_eq!(json["product_item_detail_id"], "i9");
    }
}
