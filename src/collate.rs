//! Text ordering for display names and task subjects.
//!
//! Uses the Unicode Collation Algorithm with the CLDR root order, so accented
//! letters sort next to their base letter and `Đ` follows `D`. Lowercase comes
//! before uppercase on ties, code points break any remaining tie.

use std::cell::RefCell;
use std::cmp::Ordering;

use feruca::Collator;

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

pub fn compare(left: &str, right: &str) -> Ordering {
    COLLATOR.with(|collator| collator.borrow_mut().collate(left, right))
}
