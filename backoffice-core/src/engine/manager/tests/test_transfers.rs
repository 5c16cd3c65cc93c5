use super::*;
use shared::models::{CreateTransferRequest, MovementStatus, MovementType, TransferItemInput};

fn transfer_request(items: Vec<(i64, i32)>) -> CreateTransferRequest {
    CreateTransferRequest {
        from_store_id: STORE_CENTRAL,
        to_store_id: STORE_BRANCH,
        items: items
            .into_iter()
            .map(|(product_id, quantity)| TransferItemInput {
                product_id,
                quantity,
            })
            .collect(),
        note: Some("weekly restock".to_string()),
    }
}

#[test]
fn test_create_transfer_reserves_source() {
    let manager = seeded_manager();

    let movement = manager
        .create_transfer(transfer_request(vec![(1, 10), (2, 5)]), 7)
        .unwrap();

    assert_eq!(movement.movement_type, MovementType::Export);
    assert_eq!(movement.status, MovementStatus::Pending);
    assert_eq!(movement.to_store_id, Some(STORE_BRANCH));
    assert_eq!(movement.total_quantity, 15);
    assert_eq!(movement.lines.len(), 2);

    // reserved at the source, destination untouched until approval
    assert_eq!(manager.stock_level(STORE_CENTRAL, 1).unwrap(), Some(90));
    assert_eq!(manager.stock_level(STORE_CENTRAL, 2).unwrap(), Some(45));
    assert_eq!(manager.stock_level(STORE_BRANCH, 1).unwrap(), None);
}

#[test]
fn test_create_transfer_insufficient_aborts() {
    let manager = seeded_manager();

    let err = manager
        .create_transfer(transfer_request(vec![(1, 10), (3, 11)]), 7)
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock { .. }));

    // nothing created, nothing reserved
    assert!(manager.movements().unwrap().is_empty());
    assert_eq!(manager.stock_level(STORE_CENTRAL, 1).unwrap(), Some(100));
    assert_eq!(manager.stock_level(STORE_CENTRAL, 3).unwrap(), Some(10));
}

#[test]
fn test_approve_transfer_credits_destination_once() {
    let manager = seeded_manager();

    let movement = manager
        .create_transfer(transfer_request(vec![(1, 10)]), 7)
        .unwrap();

    let approved = manager.approve_transfer(movement.id, 8).unwrap();
    assert_eq!(approved.status, MovementStatus::Completed);

    // destination record created on first receipt
    assert_eq!(manager.stock_level(STORE_BRANCH, 1).unwrap(), Some(10));

    // mirrored import movement at the destination, credited to the approver
    let movements = manager.movements().unwrap();
    assert_eq!(movements.len(), 2);
    let import = movements
        .iter()
        .find(|m| m.movement_type == MovementType::Import)
        .unwrap();
    assert_eq!(import.status, MovementStatus::Completed);
    assert_eq!(import.creater_id, 8);
    assert_eq!(import.from_store_id, STORE_CENTRAL);
    assert_eq!(import.to_store_id, Some(STORE_BRANCH));
    assert_eq!(import.lines, approved.lines);

    // second approval is rejected and the destination stays at one credit
    let err = manager.approve_transfer(movement.id, 8).unwrap_err();
    assert!(matches!(err, EngineError::InvalidMovementState(_)));
    assert_eq!(manager.stock_level(STORE_BRANCH, 1).unwrap(), Some(10));
    assert_eq!(manager.movements().unwrap().len(), 2);

    // the new destination record shows up in the inventory listing
    assert!(manager.inventory().unwrap().contains(&InventoryRecord {
        store_id: STORE_BRANCH,
        product_id: 1,
        quantity: 10,
    }));
}

#[test]
fn test_approve_import_movement_rejected() {
    let manager = seeded_manager();

    let movement = manager
        .create_transfer(transfer_request(vec![(1, 5)]), 7)
        .unwrap();
    manager.approve_transfer(movement.id, 8).unwrap();

    let import_id = manager
        .movements()
        .unwrap()
        .into_iter()
        .find(|m| m.movement_type == MovementType::Import)
        .unwrap()
        .id;
    let err = manager.approve_transfer(import_id, 8).unwrap_err();
    assert!(matches!(err, EngineError::InvalidMovementState(_)));
}

#[test]
fn test_cancel_transfer_restores_source() {
    let manager = seeded_manager();

    let movement = manager
        .create_transfer(transfer_request(vec![(1, 10)]), 7)
        .unwrap();
    assert_eq!(manager.stock_level(STORE_CENTRAL, 1).unwrap(), Some(90));

    let cancelled = manager.cancel_transfer(movement.id).unwrap();
    assert_eq!(cancelled.status, MovementStatus::Cancelled);
    assert_eq!(manager.stock_level(STORE_CENTRAL, 1).unwrap(), Some(100));
    assert_eq!(manager.stock_level(STORE_BRANCH, 1).unwrap(), None);

    // a cancelled transfer cannot be approved afterwards
    let err = manager.approve_transfer(movement.id, 8).unwrap_err();
    assert!(matches!(err, EngineError::InvalidMovementState(_)));
}

#[test]
fn test_transfer_validation() {
    let manager = seeded_manager();

    let mut request = transfer_request(vec![(1, 5)]);
    request.to_store_id = STORE_CENTRAL;
    let err = manager.create_transfer(request, 7).unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));

    let err = manager
        .create_transfer(transfer_request(vec![]), 7)
        .unwrap_err();
    assert!(matches!(err, EngineError::EmptyItems));

    let err = manager
        .create_transfer(transfer_request(vec![(99, 5)]), 7)
        .unwrap_err();
    assert!(matches!(err, EngineError::ProductNotFound(99)));

    let err = manager.approve_transfer(404, 8).unwrap_err();
    assert!(matches!(err, EngineError::MovementNotFound(404)));
}
