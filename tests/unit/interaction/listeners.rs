use super::*;

#[test]
fn guard_detaches_on_drop() {
    let listeners = PointerListeners::new();
    let owner = listeners.new_owner();

    let guard = listeners.attach(owner, &[PointerEventKind::Move, PointerEventKind::Up]);
    assert_eq!(listeners.attached_count(), 2);
    assert!(listeners.is_attached(owner, PointerEventKind::Move));
    assert_eq!(listeners.listeners_for(PointerEventKind::Up), vec![owner]);

    drop(guard);
    assert_eq!(listeners.attached_count(), 0);
    assert!(!listeners.is_attached(owner, PointerEventKind::Up));
}

#[test]
fn owners_are_independent() {
    let listeners = PointerListeners::new();
    let a = listeners.new_owner();
    let b = listeners.new_owner();
    assert_ne!(a, b);

    let ga = listeners.attach(a, &[PointerEventKind::Move]);
    let gb = listeners.attach(b, &[PointerEventKind::Move]);
    assert_eq!(listeners.listeners_for(PointerEventKind::Move), vec![a, b]);

    drop(ga);
    assert_eq!(listeners.listeners_for(PointerEventKind::Move), vec![b]);
    drop(gb);
}

#[test]
fn guard_outliving_registry_is_harmless() {
    let listeners = PointerListeners::new();
    let owner = listeners.new_owner();
    let guard = listeners.attach(owner, &[PointerEventKind::Up]);
    drop(listeners);
    drop(guard);
}

#[test]
fn clones_share_the_same_table() {
    let listeners = PointerListeners::new();
    let view = listeners.clone();
    let owner = listeners.new_owner();
    let _guard = listeners.attach(owner, &[PointerEventKind::Move]);
    assert_eq!(view.attached_count(), 1);
}
