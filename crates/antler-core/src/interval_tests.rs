use crate::interval::{Interval, IntervalSet};
use crate::token::{EOF, MAX_CHAR_VALUE};

#[test]
fn add_merges_adjacent_values() {
    let mut set = IntervalSet::new();
    set.add(3);
    set.add(1);
    set.add(2);
    set.add(7);

    assert_eq!(set.intervals(), &[Interval::new(1, 3), Interval::new(7, 7)]);
    assert_eq!(set.to_string(), "{1..3, 7}");
}

#[test]
fn add_range_swallows_covered_intervals() {
    let mut set = IntervalSet::from_values([1, 4, 9, 20]);
    set.add_range(3, 10);

    assert_eq!(set.intervals(), &[Interval::new(1, 1), Interval::new(3, 10), Interval::new(20, 20)]);
}

#[test]
fn empty_range_is_ignored() {
    let mut set = IntervalSet::new();
    set.add_range(5, 4);

    assert!(set.is_nil());
    assert_eq!(set.to_string(), "{}");
}

#[test]
fn union_of_many() {
    let a = IntervalSet::of(1);
    let b = IntervalSet::of_range(5, 6);
    let c = IntervalSet::of(2);

    let all = IntervalSet::or([&a, &b, &c]);

    assert_eq!(all.to_vec(), vec![1, 2, 5, 6]);
}

#[test]
fn intersection() {
    let a = IntervalSet::of_range(1, 10);
    let b = IntervalSet::from_values([0, 5, 6, 11]);

    assert_eq!(a.and(&b).to_vec(), vec![5, 6]);
    assert!(a.overlaps(&b));
    assert!(!IntervalSet::of(1).overlaps(&IntervalSet::of(2)));
}

#[test]
fn subtract_splits_intervals() {
    let a = IntervalSet::of_range(1, 10);
    let b = IntervalSet::from_values([3, 4, 10]);

    assert_eq!(a.subtract(&b).to_string(), "{1..2, 5..9}");
}

#[test]
fn complement_over_char_range() {
    let set = IntervalSet::from_values(['a' as i32, 'b' as i32]);

    let not = set.complement(0, MAX_CHAR_VALUE);

    assert_eq!(not.intervals(), &[Interval::new(0, 'a' as i32 - 1), Interval::new('c' as i32, MAX_CHAR_VALUE)]);
    assert!(!not.contains('a' as i32));
    assert!(not.contains('z' as i32));
    assert_eq!(not.size(), MAX_CHAR_VALUE as usize + 1 - 2);
}

#[test]
fn contains_and_single_element() {
    let set = IntervalSet::from_values([EOF, 4]);

    assert!(set.contains(EOF));
    assert!(set.contains(4));
    assert!(!set.contains(0));
    assert_eq!(set.single_element(), None);
    assert_eq!(IntervalSet::of(4).single_element(), Some(4));
    assert_eq!(set.to_string(), "{<EOF>, 4}");
    assert_eq!(IntervalSet::of(EOF).to_string(), "<EOF>");
    assert_eq!(IntervalSet::of_range(2, 3).to_string(), "{2..3}");
}

#[test]
fn remove_value() {
    let mut set = IntervalSet::of_range(1, 3);
    set.remove(2);

    assert_eq!(set.to_vec(), vec![1, 3]);
}

#[test]
fn serializes_as_interval_list() {
    let set = IntervalSet::from_values([1, 2, 5]);

    let json = serde_json::to_string(&set).unwrap();

    insta::assert_snapshot!(json, @r#"[{"a":1,"b":2},{"a":5,"b":5}]"#);
}
