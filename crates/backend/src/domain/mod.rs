pub mod a001_category;
pub mod a002_store;
pub mod a003_product;
pub mod a004_cart;
pub mod a005_order;
pub mod a006_review;
pub mod a007_address;
pub mod a008_wishlist;
