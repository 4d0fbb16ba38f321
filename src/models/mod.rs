mod item;

pub use item::{
    HistoryWindow, Item, ItemKey, ItemStatus, ItemType, ItemUpdate, ListFilter, NewItem, TagCount,
};
