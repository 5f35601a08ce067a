//! Integration tests for the arena-backed queue.

use fixalloc_collections::{LinkedQueue, QueueError};
use fixalloc_core::{AllocError, Arena, ReclaimPolicy};

/// Bytes one `i32` node occupies: payload, padding and the next link.
const I32_NODE: usize = 16;

#[derive(Clone, Debug, PartialEq)]
struct Person {
    name: String,
    age: u32,
}

impl Person {
    fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

fn contents<T: Copy>(queue: &LinkedQueue<'_, T>) -> Vec<T> {
    queue.iter().copied().collect()
}

#[test]
fn test_fifo_order() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);

    queue.push(1).unwrap();
    queue.push(2).unwrap();
    queue.push(3).unwrap();

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.pop().unwrap(), 1);
    assert_eq!(queue.pop().unwrap(), 2);
    assert_eq!(queue.pop().unwrap(), 3);
    assert!(queue.is_empty());
}

#[test]
fn test_front_and_back() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);

    queue.push(10).unwrap();
    assert_eq!(*queue.front().unwrap(), 10);
    assert_eq!(*queue.back().unwrap(), 10);

    queue.push(20).unwrap();
    assert_eq!(*queue.front().unwrap(), 10);
    assert_eq!(*queue.back().unwrap(), 20);
}

#[test]
fn test_mutation_through_front_and_back() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);
    queue.try_extend([1, 2, 3]).unwrap();

    *queue.front_mut().unwrap() = 100;
    *queue.back_mut().unwrap() += 1;

    assert_eq!(contents(&queue), vec![100, 2, 4]);
    assert_eq!(queue.pop().unwrap(), 100);
}

#[test]
fn test_empty_queue_errors() {
    let arena = Arena::new(1024);
    let mut queue: LinkedQueue<'_, i32> = LinkedQueue::new(&arena);

    assert_eq!(queue.pop(), Err(QueueError::EmptyQueue));
    assert_eq!(queue.front(), Err(QueueError::EmptyQueue));
    assert_eq!(queue.back(), Err(QueueError::EmptyQueue));
    assert_eq!(queue.front_mut(), Err(QueueError::EmptyQueue));
    assert_eq!(queue.back_mut(), Err(QueueError::EmptyQueue));
}

#[test]
fn test_clear() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);
    queue.try_extend(0..5).unwrap();

    queue.clear().unwrap();

    assert!(queue.is_empty());
    assert_eq!(queue.begin(), queue.end());
    assert_eq!(arena.occupied_count(), 0);

    // Clearing an empty queue is fine.
    queue.clear().unwrap();
}

#[test]
fn test_push_cloned_leaves_source_intact() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);
    let alice = Person::new("Alice", 30);

    queue.push_cloned(&alice).unwrap();
    queue.push(Person::new("Bob", 25)).unwrap();

    assert_eq!(queue.front().unwrap(), &alice);
    assert_eq!(alice.name, "Alice");
    assert_eq!(queue.pop().unwrap(), alice);
    assert_eq!(queue.pop().unwrap().name, "Bob");
}

#[test]
fn test_copy_is_independent() {
    let arena = Arena::new(1024);
    let mut original = LinkedQueue::new(&arena);
    original.try_extend([1, 2, 3]).unwrap();

    let mut copy = original.try_clone().unwrap();
    assert_eq!(copy, original);
    assert_eq!(arena.occupied_count(), 6);

    copy.push(4).unwrap();
    *copy.front_mut().unwrap() = 0;

    assert_eq!(contents(&original), vec![1, 2, 3]);
    assert_eq!(contents(&copy), vec![0, 2, 3, 4]);

    // And the other way round.
    original.push(5).unwrap();
    assert_eq!(original.pop().unwrap(), 1);
    *original.back_mut().unwrap() = 50;

    assert_eq!(contents(&original), vec![2, 3, 50]);
    assert_eq!(copy.len(), 4);
    assert_eq!(contents(&copy), vec![0, 2, 3, 4]);
}

#[test]
fn test_cross_arena_move_out_of_memory_keeps_elements() {
    let source_arena = Arena::new(1024);
    let target_arena = Arena::new(2 * I32_NODE);

    let mut source = LinkedQueue::new(&source_arena);
    source.try_extend([1, 2, 3]).unwrap();
    let mut target = LinkedQueue::new(&target_arena);

    assert!(matches!(
        target.move_from(&mut source),
        Err(QueueError::Alloc(AllocError::OutOfMemory { .. }))
    ));
    assert_eq!(target.len() + source.len(), 3);
    assert_eq!(contents(&target), vec![1, 2]);
    assert_eq!(contents(&source), vec![3]);

    // Retrying clears the target first, which makes room.
    target.move_from(&mut source).unwrap();
    assert_eq!(contents(&target), vec![3]);
    assert!(source.is_empty());
}

#[test]
fn test_copy_assignment_uses_target_arena() {
    let source_arena = Arena::new(1024);
    let target_arena = Arena::new(1024);

    let mut source = LinkedQueue::new(&source_arena);
    source.try_extend([Person::new("Ada", 36), Person::new("Linus", 21)]).unwrap();

    let mut target = LinkedQueue::new(&target_arena);
    target.push(Person::new("Old", 99)).unwrap();

    target.try_clone_from(&source).unwrap();

    assert_eq!(target, source);
    assert_eq!(target.arena(), &target_arena);
    assert_eq!(target_arena.occupied_count(), 2);
    assert_eq!(source_arena.occupied_count(), 2);
}

#[test]
fn test_move_leaves_source_empty() {
    let arena = Arena::new(1024);
    let mut source = LinkedQueue::new(&arena);
    source.try_extend([1, 2, 3]).unwrap();
    let used = arena.used();

    let moved = source.take();

    assert_eq!(contents(&moved), vec![1, 2, 3]);
    assert!(source.is_empty());
    assert_eq!(source.len(), 0);
    assert_eq!(arena.used(), used);
    assert_eq!(arena.occupied_count(), 3);

    // The emptied source is still usable.
    source.push(9).unwrap();
    assert_eq!(*source.front().unwrap(), 9);
}

#[test]
fn test_move_assignment_same_arena() {
    let arena = Arena::new(1024);
    let mut source = LinkedQueue::new(&arena);
    source.try_extend([1, 2, 3]).unwrap();

    let mut target = LinkedQueue::new(&arena);
    target.try_extend([7, 8]).unwrap();
    let used = arena.used();

    target.move_from(&mut source).unwrap();

    assert_eq!(contents(&target), vec![1, 2, 3]);
    assert!(source.is_empty());
    // Relinked in place: no new regions, the target's old nodes were freed.
    assert_eq!(arena.used(), used);
    assert_eq!(arena.occupied_count(), 3);
    assert_eq!(arena.free_count(), 2);
}

#[test]
fn test_move_assignment_across_arenas() {
    let source_arena = Arena::new(1024);
    let target_arena = Arena::with_policy(1024, ReclaimPolicy::Tombstone);

    let mut source = LinkedQueue::new(&source_arena);
    source.try_extend([1, 2, 3]).unwrap();

    let mut target = LinkedQueue::new(&target_arena);
    target.move_from(&mut source).unwrap();

    assert_eq!(contents(&target), vec![1, 2, 3]);
    assert!(source.is_empty());
    assert_eq!(source_arena.occupied_count(), 0);
    assert_eq!(target_arena.occupied_count(), 3);

    // Dropping both must hand every node back to the arena that made it.
    drop(target);
    drop(source);
    assert_eq!(target_arena.occupied_count(), 0);
}

#[test]
fn test_cursor_traversal() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);
    queue.try_extend([10, 20, 30]).unwrap();

    let mut sum = 0;
    let mut cursor = queue.begin();
    while cursor != queue.end() {
        sum += *cursor.get().unwrap();
        cursor.advance();
    }

    assert_eq!(sum, 60);
    assert!(cursor.is_end());
    assert_eq!(cursor.get(), Err(QueueError::EndCursorDereference));
}

#[test]
fn test_cursor_post_advance() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);
    queue.try_extend([10, 20]).unwrap();

    let mut cursor = queue.begin();
    assert_eq!(*cursor.post_advance().get().unwrap(), 10);
    assert_eq!(*cursor.post_advance().get().unwrap(), 20);
    assert_eq!(cursor, queue.end());
}

#[test]
fn test_iteration_by_reference() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);
    queue.try_extend([Person::new("A", 1), Person::new("B", 2)]).unwrap();

    let names: Vec<&str> = (&queue).into_iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);

    for person in &mut queue {
        person.age += 10;
    }
    assert_eq!(queue.back().unwrap().age, 12);
}

#[test]
fn test_out_of_memory_propagates() {
    let arena = Arena::new(3 * I32_NODE);
    let mut queue = LinkedQueue::new(&arena);
    queue.try_extend([1, 2, 3]).unwrap();

    let err = queue.push(4).unwrap_err();

    assert!(matches!(err, QueueError::Alloc(AllocError::OutOfMemory { .. })));
    assert_eq!(contents(&queue), vec![1, 2, 3]);

    // Freeing one node makes room again.
    queue.pop().unwrap();
    queue.push(4).unwrap();
    assert_eq!(contents(&queue), vec![2, 3, 4]);
}

#[test]
fn test_popped_nodes_are_reused() {
    for policy in ReclaimPolicy::ALL {
        let arena = Arena::with_policy(1024, policy);
        let mut queue = LinkedQueue::new(&arena);

        for i in 0..5 {
            queue.push(i).unwrap();
        }
        let high_water = arena.used();
        assert_eq!(high_water, 5 * I32_NODE, "{policy:?}");

        for _ in 0..3 {
            queue.pop().unwrap();
        }
        assert_eq!(arena.used(), high_water, "{policy:?}");
        assert_eq!(arena.free_count(), 3, "{policy:?}");

        for i in 5..8 {
            queue.push(i).unwrap();
        }
        assert_eq!(arena.used(), high_water, "{policy:?}");
        assert_eq!(arena.free_count(), 0, "{policy:?}");
        assert_eq!(contents(&queue), vec![3, 4, 5, 6, 7], "{policy:?}");
    }
}

#[test]
fn test_string_payloads_survive_churn() {
    let arena = Arena::new(4096);
    let mut queue = LinkedQueue::new(&arena);

    for round in 0..10 {
        queue.push(Person::new(&format!("p{round}"), round)).unwrap();
        if round % 3 == 2 {
            let person = queue.pop().unwrap();
            assert!(person.name.starts_with('p'));
        }
    }

    let ages: Vec<u32> = queue.iter().map(|p| p.age).collect();
    assert_eq!(ages, vec![3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn test_debug_lists_elements() {
    let arena = Arena::new(1024);
    let mut queue = LinkedQueue::new(&arena);
    queue.try_extend([1, 2]).unwrap();
    assert_eq!(format!("{queue:?}"), "[1, 2]");
}
