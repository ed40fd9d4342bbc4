pub mod catalog;
pub mod danmu;
pub mod interaction;
pub mod recommend;
pub mod refresh;
pub mod search;
