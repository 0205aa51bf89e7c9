//! Integration tests for stock costing, movements, point-of-sale and production.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use kontor_core::{erp::BomLine, inventory::MovementLine};
use kontor_db::{
    InventoryRepository, ManufacturingRepository, PosRepository, RepoError,
    entities::sea_orm_active_enums::{
        MovementStatus, MovementType, PaymentMethod, ProductionStatus, SaleStatus,
    },
    repositories::{
        CreateBomInput, CreateMovementInput, CreateProductionOrderInput, CreateSaleInput,
        SaleLineInput, StockFilter,
    },
};

use common::TestOrg;

async fn on_hand(t: &TestOrg, product_id: Uuid, warehouse_id: Uuid) -> (Decimal, Decimal) {
    let levels = InventoryRepository::new(t.db.clone())
        .list_stock_levels(
            t.org_id,
            StockFilter {
                product_id: Some(product_id),
                warehouse_id: Some(warehouse_id),
            },
        )
        .await
        .expect("Failed to list stock");
    levels
        .first()
        .map_or((Decimal::ZERO, Decimal::ZERO), |l| {
            (l.level.quantity, l.level.average_cost)
        })
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_receipts_use_weighted_average_cost() {
    let Some(t) = common::setup().await else {
        return;
    };
    let wh = t.warehouse("MAIN").await;
    let widget = t.product("W-1", dec!(25)).await;

    t.receive(widget, wh, dec!(10), dec!(4)).await;
    t.receive(widget, wh, dec!(30), dec!(6)).await;

    let (qty, cost) = on_hand(&t, widget, wh).await;
    assert_eq!(qty, dec!(40));
    assert_eq!(cost, dec!(5.5));
}

fn transfer(source: Uuid, destination: Uuid, lines: Vec<MovementLine>) -> CreateMovementInput {
    CreateMovementInput {
        movement_type: MovementType::Transfer,
        source_warehouse_id: Some(source),
        destination_warehouse_id: Some(destination),
        movement_date: None,
        reference: None,
        notes: None,
        lines,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_transfer_carries_source_average_cost() {
    let Some(t) = common::setup().await else {
        return;
    };
    let main = t.warehouse("MAIN").await;
    let store = t.warehouse("STORE").await;
    let bolt = t.product("BOLT", dec!(1)).await;
    t.receive(bolt, main, dec!(10), dec!(2)).await;
    t.receive(bolt, main, dec!(10), dec!(4)).await;
    t.receive(bolt, store, dec!(5), dec!(6)).await;

    let repo = InventoryRepository::new(t.db.clone());
    let draft = repo
        .create_movement(
            t.org_id,
            t.user_id,
            transfer(
                main,
                store,
                vec![MovementLine { product_id: bolt, quantity: dec!(5), unit_cost: None }],
            ),
        )
        .await
        .expect("Failed to create movement");
    assert_eq!(draft.movement.status, MovementStatus::Draft);
    // Drafts do not touch stock
    assert_eq!(on_hand(&t, bolt, main).await.0, dec!(20));

    let confirmed = repo
        .confirm_movement(t.org_id, draft.movement.id, t.user_id)
        .await
        .expect("Failed to confirm movement");
    assert_eq!(confirmed.movement.status, MovementStatus::Confirmed);
    assert_eq!(confirmed.movement.confirmed_by, Some(t.user_id));

    assert_eq!(on_hand(&t, bolt, main).await, (dec!(15), dec!(3)));
    // (5 × 6 + 5 × 3) / 10
    assert_eq!(on_hand(&t, bolt, store).await, (dec!(10), dec!(4.5)));

    let err = repo
        .confirm_movement(t.org_id, draft.movement.id, t.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "reconfirm accepted: {err}");
    assert_eq!(on_hand(&t, bolt, main).await.0, dec!(15));

    let err = repo.cancel_movement(t.org_id, draft.movement.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "confirmed movement cancelled: {err}");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_short_movement_line_rolls_back_whole_document() {
    let Some(t) = common::setup().await else {
        return;
    };
    let main = t.warehouse("MAIN").await;
    let store = t.warehouse("STORE").await;
    let nut = t.product("NUT", dec!(1)).await;
    let washer = t.product("WASHER", dec!(1)).await;
    t.receive(nut, main, dec!(10), dec!(1)).await;
    t.receive(washer, main, dec!(2), dec!(1)).await;

    let repo = InventoryRepository::new(t.db.clone());
    let draft = repo
        .create_movement(
            t.org_id,
            t.user_id,
            transfer(
                main,
                store,
                vec![
                    MovementLine { product_id: nut, quantity: dec!(4), unit_cost: None },
                    MovementLine { product_id: washer, quantity: dec!(3), unit_cost: None },
                ],
            ),
        )
        .await
        .expect("Failed to create movement");

    let err = repo
        .confirm_movement(t.org_id, draft.movement.id, t.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "unexpected error: {err}");

    assert_eq!(on_hand(&t, nut, main).await.0, dec!(10));
    assert_eq!(on_hand(&t, nut, store).await.0, Decimal::ZERO);
    assert_eq!(on_hand(&t, washer, main).await.0, dec!(2));

    let movement = repo
        .get_movement(t.org_id, draft.movement.id)
        .await
        .expect("Failed to load movement");
    assert_eq!(movement.movement.status, MovementStatus::Draft);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_sale_takes_stock_and_refund_restores_it() {
    let Some(t) = common::setup().await else {
        return;
    };
    let wh = t.warehouse("SHOP").await;
    let mug = t.product("MUG", dec!(12.50)).await;
    t.receive(mug, wh, dec!(20), dec!(3)).await;

    let repo = PosRepository::new(t.db.clone());
    let sale = repo
        .create_sale(
            t.org_id,
            t.user_id,
            CreateSaleInput {
                warehouse_id: wh,
                contact_id: None,
                payment_method: PaymentMethod::Cash,
                amount_tendered: Some(dec!(50)),
                lines: vec![SaleLineInput {
                    product_id: mug,
                    quantity: dec!(3),
                    unit_price: None,
                    discount_percent: Decimal::ZERO,
                    tax_rate: dec!(10),
                }],
            },
        )
        .await
        .expect("Failed to create sale");

    assert_eq!(sale.sale.sale_number, "POS-000001");
    assert_eq!(sale.sale.total, dec!(41.25));
    assert_eq!(sale.sale.change_due, dec!(8.75));
    assert_eq!(sale.lines[0].unit_price, dec!(12.50));
    assert_eq!(sale.lines[0].unit_cost, dec!(3));
    assert_eq!(on_hand(&t, mug, wh).await.0, dec!(17));

    let refunded = repo
        .refund_sale(t.org_id, sale.sale.id)
        .await
        .expect("Failed to refund sale");
    assert_eq!(refunded.sale.status, SaleStatus::Refunded);
    assert_eq!(on_hand(&t, mug, wh).await, (dec!(20), dec!(3)));

    let err = repo.refund_sale(t.org_id, sale.sale.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "double refund accepted: {err}");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_sale_rejects_missing_stock() {
    let Some(t) = common::setup().await else {
        return;
    };
    let wh = t.warehouse("SHOP").await;
    let mug = t.product("MUG", dec!(12.50)).await;
    t.receive(mug, wh, dec!(1), dec!(3)).await;

    let err = PosRepository::new(t.db.clone())
        .create_sale(
            t.org_id,
            t.user_id,
            CreateSaleInput {
                warehouse_id: wh,
                contact_id: None,
                payment_method: PaymentMethod::Card,
                amount_tendered: None,
                lines: vec![SaleLineInput {
                    product_id: mug,
                    quantity: dec!(2),
                    unit_price: None,
                    discount_percent: Decimal::ZERO,
                    tax_rate: Decimal::ZERO,
                }],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Domain(_)), "unexpected error: {err}");
    assert_eq!(on_hand(&t, mug, wh).await.0, dec!(1));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_production_consumes_components_at_cost() {
    let Some(t) = common::setup().await else {
        return;
    };
    let wh = t.warehouse("PLANT").await;
    let table = t.product("TABLE", dec!(150)).await;
    let plank = t.product("PLANK", dec!(0)).await;
    let screw = t.product("SCREW", dec!(0)).await;
    t.receive(plank, wh, dec!(100), dec!(3)).await;
    t.receive(screw, wh, dec!(1000), dec!(0.10)).await;

    let repo = ManufacturingRepository::new(t.db.clone());
    let bom = repo
        .create_bom(
            t.org_id,
            CreateBomInput {
                product_id: table,
                name: "Table".to_string(),
                output_quantity: dec!(1),
                lines: vec![
                    BomLine { component_id: plank, quantity: dec!(4) },
                    BomLine { component_id: screw, quantity: dec!(20) },
                ],
            },
        )
        .await
        .expect("Failed to create BOM");

    let order = repo
        .create_order(
            t.org_id,
            t.user_id,
            CreateProductionOrderInput {
                bom_id: bom.bom.id,
                warehouse_id: wh,
                quantity: dec!(5),
            },
        )
        .await
        .expect("Failed to create order");
    assert_eq!(order.order_number, "PO-000001");

    let done = repo
        .complete_order(t.org_id, order.id)
        .await
        .expect("Failed to complete order");
    assert_eq!(done.status, ProductionStatus::Completed);
    // (20 × 3 + 100 × 0.10) / 5
    assert_eq!(done.unit_cost, Some(dec!(14)));

    assert_eq!(on_hand(&t, plank, wh).await, (dec!(80), dec!(3)));
    assert_eq!(on_hand(&t, screw, wh).await.0, dec!(900));
    assert_eq!(on_hand(&t, table, wh).await, (dec!(5), dec!(14)));

    let err = repo.cancel_order(t.org_id, order.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "completed order cancelled: {err}");
}
