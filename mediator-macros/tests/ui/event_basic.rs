use mediator_abstractions::{Event, Message, MessageMetadata};
use mediator_macros::event;

// 已显式声明的 metadata 字段保持原位
#[event]
#[derive(Debug)]
struct UserCreated {
    id: u64,
    metadata: MessageMetadata,
}

#[event]
struct Tick;

fn assert_event<E: Event>(_: &E) {}

fn main() {
    let created = UserCreated::new(7);
    assert_event(&created);
    assert_eq!(created.id, 7);

    let tick = Tick::new();
    assert_event(&tick);
    let erased: &dyn Message = &tick;
    assert_eq!(erased.name(), "Tick");
    assert!(erased.downcast_ref::<Tick>().is_some());
}
