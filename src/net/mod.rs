//! # Petri 网模型（Place/Transition Net）
//!
//! 库所集合 `P`、迁移集合 `T` 与带正整数权重的弧。输入弧 `Pre(p, t)` 与
//! 输出弧 `Post(t, p)` 决定发生语义。对当前标识 `M`：
//!
//! * 迁移 `t` **可激发** 当且仅当 `t` 至少有一条输入弧，且
//!   `∀p ∈ •t: M[p] ≥ Pre(p, t)`；
//! * 迁移发生后 `M'[p] = M[p] - Pre(p, t) + Post(t, p)`，先消耗再产生。
//!
//! 标识只通过 [`Net::consume_tokens`] 与 [`Net::produce_tokens`] 变化。
//!
//! ## 示例
//!
//! ```rust
//! use pn_play::net::*;
//!
//! let mut net = Net::empty();
//! let p0 = net.add_place("p0", 1).unwrap();
//! let p1 = net.add_place("p1", 0).unwrap();
//! let t0 = net.add_transition("t0").unwrap();
//!
//! net.set_input_weight(&p0, &t0, 1).unwrap();
//! net.set_output_weight(&t0, &p1, 1).unwrap();
//!
//! assert_eq!(net.enabled_transitions(), vec![t0]);
//! assert_eq!(net.marking().tokens("p1"), 0);
//! ```

pub mod core;
pub mod ids;
pub mod io;
pub mod structure;

pub use self::core::{DiagnosticReport, EnablingRefresh, Net, NetError};
pub use ids::{PlaceId, TransitionId};
pub use structure::{Arc, ArcDirection, Marking, Place, PlaceList, Transition, Weight, arc_key};
