//! Transcript matching.
//!
//! Matching is a pure function of a node and a transcript. Every shape is
//! deterministic except `product`, which searches for the shortest prefix
//! whose per-channel shares each match their sub-protocol exactly.
//!
//! Each product share is matched by a nested matcher over the share alone.
//! Loops still open in enclosing matchers are handed down together with the
//! tokens they had left, so a loop that comes back to itself through a
//! product without consuming anything is caught like any other left
//! recursion.

use super::grammar::{Grammar, Node, NodeId};
use super::mismatch::{ChannelMismatch, Mismatch, UntaggedToken};
use crate::config::MatchConfig;
use std::collections::{BTreeMap, HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, trace};

/// A loop open in an enclosing matcher and the tokens it still had to match.
#[derive(Clone, Debug)]
struct OpenLoop {
    node: NodeId,
    rest: Vec<String>,
}

struct Matcher<'a> {
    grammar: &'a Grammar,
    tokens: &'a [&'a str],
    config: &'a MatchConfig,
    enclosing: &'a [OpenLoop],
    memo: HashMap<(NodeId, usize), Result<usize, Mismatch>>,
    active: HashSet<(NodeId, usize)>,
    /// Number of `NoProgress` cuts taken so far. Results computed across a
    /// cut depend on which loops were open and are not memoized.
    cuts: usize,
}

impl<'a> Matcher<'a> {
    fn new(grammar: &'a Grammar, tokens: &'a [&'a str], config: &'a MatchConfig, enclosing: &'a [OpenLoop]) -> Self {
        Self {
            grammar,
            tokens,
            config,
            enclosing,
            memo: HashMap::new(),
            active: HashSet::new(),
            cuts: 0,
        }
    }

    fn token(&self, at: usize) -> Option<String> {
        self.tokens.get(at).map(|token| token.to_string())
    }

    /// Match `node` against the whole transcript.
    fn exact(&mut self, node: NodeId) -> Result<(), Mismatch> {
        let end = self.at(node, 0)?;
        if end < self.tokens.len() {
            return Err(Mismatch::Trailing {
                leftover: self.tokens[end..].iter().map(|t| t.to_string()).collect(),
            });
        }
        Ok(())
    }

    /// Match `node` at `pos`, returning the position after the match.
    fn at(&mut self, node: NodeId, pos: usize) -> Result<usize, Mismatch> {
        if self.config.memoize {
            if let Some(hit) = self.memo.get(&(node, pos)) {
                return hit.clone();
            }
        }
        let cuts = self.cuts;
        let result = self.uncached(node, pos);
        if self.config.memoize && self.cuts == cuts {
            self.memo.insert((node, pos), result.clone());
        }
        result
    }

    /// Whether `node` is already open at `pos`, here or in an enclosing
    /// matcher with the same tokens left.
    fn reentered(&self, node: NodeId, pos: usize) -> bool {
        if self.active.contains(&(node, pos)) {
            return true;
        }
        let rest = &self.tokens[pos..];
        self.enclosing
            .iter()
            .any(|open| open.node == node && open.rest.iter().map(String::as_str).eq(rest.iter().copied()))
    }

    fn uncached(&mut self, node: NodeId, pos: usize) -> Result<usize, Mismatch> {
        let grammar = self.grammar;
        let Some(shape) = grammar.get(node) else {
            return Err(Mismatch::UnknownNode { node: node.index() });
        };
        match shape {
            Node::Emit(expected) => match self.tokens.get(pos) {
                Some(token) if *token == expected.as_str() => Ok(pos + 1),
                _ => Err(Mismatch::Token {
                    expected: expected.clone(),
                    found: self.token(pos),
                    at: pos,
                }),
            },
            Node::Sequence(parts) => {
                let mut pos = pos;
                for (index, part) in parts.iter().enumerate() {
                    pos = self.at(*part, pos).map_err(|reason| Mismatch::Step {
                        index,
                        reason: Box::new(reason),
                    })?;
                }
                Ok(pos)
            }
            Node::Choice(branches) => {
                match self.tokens.get(pos).and_then(|tag| branches.get(*tag)) {
                    Some(branch) => self.at(*branch, pos + 1),
                    None => Err(Mismatch::Choice {
                        expected: branches.keys().cloned().collect(),
                        found: self.token(pos),
                        at: pos,
                    }),
                }
            }
            Node::Loop(None) => Err(Mismatch::Unresolved { node: node.index() }),
            Node::Loop(Some(body)) => {
                if self.reentered(node, pos) {
                    self.cuts += 1;
                    return Err(Mismatch::NoProgress { at: pos });
                }
                self.active.insert((node, pos));
                let result = self.at(*body, pos);
                self.active.remove(&(node, pos));
                result
            }
            Node::Product(channels) => self.product(channels, pos),
        }
    }

    /// Loops open here and in every enclosing matcher.
    fn open_loops(&self) -> Vec<OpenLoop> {
        let mut open = self.enclosing.to_vec();
        open.extend(self.active.iter().map(|&(node, pos)| OpenLoop {
            node,
            rest: self.tokens[pos..].iter().map(|t| t.to_string()).collect(),
        }));
        open
    }

    /// Match one channel's share exactly in a nested matcher.
    fn share(&mut self, name: &str, node: NodeId, share: &[&str], open: &[OpenLoop]) -> Result<(), ChannelMismatch> {
        let mut nested = Matcher::new(self.grammar, share, self.config, open);
        let result = nested.exact(node);
        if nested.cuts > 0 {
            self.cuts += 1;
        }
        result.map_err(|reason| ChannelMismatch {
            channel: name.to_string(),
            reason,
        })
    }

    /// Find the shortest prefix from `pos` whose tagged tokens split into
    /// shares that every channel matches exactly.
    ///
    /// Only one share grows per split, so only that channel is re-matched;
    /// the others keep their verdict from the previous split.
    fn product(&mut self, channels: &BTreeMap<String, NodeId>, pos: usize) -> Result<usize, Mismatch> {
        let tokens = self.tokens;
        let rest = &tokens[pos..];
        let open = self.open_loops();
        let mut shares: BTreeMap<&str, Vec<&str>> =
            channels.keys().map(|name| (name.as_str(), Vec::new())).collect();
        let mut verdicts: BTreeMap<&str, Result<(), ChannelMismatch>> = BTreeMap::new();
        for (name, node) in channels {
            let verdict = self.share(name, *node, &[], &open);
            verdicts.insert(name.as_str(), verdict);
        }
        let mut longest = (0, Vec::new());
        let mut blocked = None;

        for split in 0..=rest.len() {
            if split > 0 {
                let token = rest[split - 1];
                let tagged = token
                    .split_once('/')
                    .and_then(|(channel, value)| channels.get_key_value(channel).map(|(name, node)| (name, *node, value)));
                let Some((name, node, value)) = tagged else {
                    // every longer prefix contains this token too
                    blocked = Some(UntaggedToken {
                        token: token.to_string(),
                        at: pos + split - 1,
                    });
                    break;
                };
                let share = shares.entry(name.as_str()).or_default();
                share.push(value);
                let verdict = self.share(name, node, share.as_slice(), &open);
                verdicts.insert(name.as_str(), verdict);
            }

            let checks: Vec<Validation<(), NonEmptyVec<ChannelMismatch>>> = verdicts
                .values()
                .map(|verdict| match verdict {
                    Ok(()) => Validation::success(()),
                    Err(failure) => Validation::fail(failure.clone()),
                })
                .collect();

            match Validation::all_vec(checks) {
                Validation::Success(_) => {
                    debug!(at = pos, split, "product: interleaving matched");
                    return Ok(pos + split);
                }
                Validation::Failure(failures) => {
                    trace!(at = pos, split, failing = failures.len(), "product: split rejected");
                    longest = (split, failures.iter().cloned().collect());
                }
            }
        }

        let (split, channels) = longest;
        Err(Mismatch::Product {
            split,
            channels,
            blocked,
        })
    }
}

impl Grammar {
    /// Match `node` against a prefix of `tokens`, returning how many tokens
    /// it consumed.
    pub fn matches_prefix<T: AsRef<str>>(&self, node: NodeId, tokens: &[T]) -> Result<usize, Mismatch> {
        self.matches_prefix_with(node, tokens, &MatchConfig::default())
    }

    pub fn matches_prefix_with<T: AsRef<str>>(
        &self,
        node: NodeId,
        tokens: &[T],
        config: &MatchConfig,
    ) -> Result<usize, Mismatch> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        Matcher::new(self, &tokens, config, &[]).at(node, 0)
    }

    /// Decide whether `tokens` is a complete execution of `node`.
    ///
    /// Succeeds only if the whole transcript is consumed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chanalg::protocol::{Grammar, Mismatch};
    ///
    /// let mut g = Grammar::new();
    /// let hello = g.emit("hello");
    /// assert!(g.check(hello, &["hello"]).is_ok());
    /// assert!(matches!(
    ///     g.check(hello, &["hello", "again"]),
    ///     Err(Mismatch::Trailing { .. })
    /// ));
    /// ```
    pub fn check<T: AsRef<str>>(&self, node: NodeId, tokens: &[T]) -> Result<(), Mismatch> {
        self.check_with(node, tokens, &MatchConfig::default())
    }

    pub fn check_with<T: AsRef<str>>(&self, node: NodeId, tokens: &[T], config: &MatchConfig) -> Result<(), Mismatch> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        Matcher::new(self, &tokens, config, &[]).exact(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(g: &mut Grammar, a: &str, b: &str) -> NodeId {
        let a = g.emit(a);
        let b = g.emit(b);
        g.sequence([a, b])
    }

    #[test]
    fn emit_reports_expected_and_found() {
        let mut g = Grammar::new();
        let a = g.emit("a");
        assert_eq!(
            g.check(a, &["b"]).unwrap_err(),
            Mismatch::Token {
                expected: "a".to_string(),
                found: Some("b".to_string()),
                at: 0
            }
        );
        assert_eq!(
            g.check::<&str>(a, &[]).unwrap_err(),
            Mismatch::Token {
                expected: "a".to_string(),
                found: None,
                at: 0
            }
        );
    }

    #[test]
    fn sequence_reports_failing_step() {
        let mut g = Grammar::new();
        let ab = pair(&mut g, "a", "b");
        match g.check(ab, &["a", "c"]).unwrap_err() {
            Mismatch::Step { index, reason } => {
                assert_eq!(index, 1);
                assert!(matches!(*reason, Mismatch::Token { at: 1, .. }));
            }
            other => panic!("unexpected mismatch {other:?}"),
        }
    }

    #[test]
    fn choice_lists_valid_tags() {
        let mut g = Grammar::new();
        let done = g.done();
        let c = g.choice([("yes", done), ("no", done)]).unwrap();
        assert!(g.check(c, &["no"]).is_ok());
        assert_eq!(
            g.check(c, &["maybe"]).unwrap_err(),
            Mismatch::Choice {
                expected: vec!["no".to_string(), "yes".to_string()],
                found: Some("maybe".to_string()),
                at: 0
            }
        );
    }

    #[test]
    fn prefix_match_leaves_remainder() {
        let mut g = Grammar::new();
        let ab = pair(&mut g, "a", "b");
        assert_eq!(g.matches_prefix(ab, &["a", "b", "c"]), Ok(2));
        assert_eq!(
            g.check(ab, &["a", "b", "c"]).unwrap_err(),
            Mismatch::Trailing {
                leftover: vec!["c".to_string()]
            }
        );
    }

    #[test]
    fn loop_without_exit_never_matches() {
        let mut g = Grammar::new();
        let forever = g
            .looped(|g, this| {
                let tick = g.emit("tick");
                Ok(g.sequence([tick, this]))
            })
            .unwrap();
        assert!(g.check(forever, &["tick", "tick", "tick"]).is_err());
        assert!(g.check::<&str>(forever, &[]).is_err());
    }

    #[test]
    fn left_recursive_loop_fails_without_overflow() {
        let mut g = Grammar::new();
        let stuck = g.looped(|_, this| Ok(this)).unwrap();
        assert_eq!(
            g.check(stuck, &["x"]).unwrap_err(),
            Mismatch::NoProgress { at: 0 }
        );
    }

    #[test]
    fn left_recursion_through_product_fails_without_overflow() {
        let mut g = Grammar::new();
        let stuck = g.looped(|g, this| g.product([("left", this)])).unwrap();
        let plain = MatchConfig { memoize: false };

        for transcript in [vec!["left/x"], vec![], vec!["left/left/x", "left/y"]] {
            let mismatch = g.check(stuck, &transcript).unwrap_err();
            assert!(matches!(mismatch, Mismatch::Product { .. }), "{mismatch:?}");
            assert_eq!(g.check_with(stuck, &transcript, &plain), Err(mismatch));
        }
    }

    #[test]
    fn recursion_through_product_matches_when_it_consumes() {
        let mut g = Grammar::new();
        let tree = g
            .looped(|g, this| {
                let leaf = g.done();
                let branch = g.product([("left", this)])?;
                g.choice([("leaf", leaf), ("node", branch)])
            })
            .unwrap();
        assert!(g.check(tree, &["node", "left/node", "left/left/leaf"]).is_ok());
        assert!(g.check(tree, &["node", "left/node"]).is_err());
    }

    #[test]
    fn foreign_node_is_a_mismatch() {
        let mut g = Grammar::new();
        g.emit("a");
        let mut other = Grammar::new();
        other.emit("x");
        let foreign = other.emit("y");
        assert_eq!(
            g.check(foreign, &["y"]),
            Err(Mismatch::UnknownNode { node: 1 })
        );
        assert_eq!(
            g.matches_prefix(foreign, &["y"]),
            Err(Mismatch::UnknownNode { node: 1 })
        );
    }

    #[test]
    fn long_interleaved_product_matches() {
        let mut g = Grammar::new();
        let ticks = g
            .looped(|g, this| {
                let done = g.done();
                g.choice([("end", done), ("tick", this)])
            })
            .unwrap();
        let p = g.product([("left", ticks), ("right", ticks)]).unwrap();

        let mut transcript = Vec::new();
        for _ in 0..100 {
            transcript.push("left/tick");
            transcript.push("right/tick");
        }
        transcript.push("right/end");
        transcript.push("left/end");
        assert!(g.check(p, &transcript).is_ok());

        transcript.pop();
        assert!(g.check(p, &transcript).is_err());
    }

    #[test]
    fn product_accepts_any_interleaving() {
        let mut g = Grammar::new();
        let ab = pair(&mut g, "a", "b");
        let xy = pair(&mut g, "x", "y");
        let p = g.product([("left", ab), ("right", xy)]).unwrap();

        for transcript in [
            ["left/a", "left/b", "right/x", "right/y"],
            ["right/x", "left/a", "right/y", "left/b"],
            ["left/a", "right/x", "left/b", "right/y"],
        ] {
            assert!(g.check(p, &transcript).is_ok(), "{transcript:?}");
        }
        assert!(g.check(p, &["left/b", "left/a", "right/x", "right/y"]).is_err());
    }

    #[test]
    fn product_consumes_shortest_complete_prefix() {
        let mut g = Grammar::new();
        let a = g.emit("a");
        let x = g.emit("x");
        let p = g.product([("left", a), ("right", x)]).unwrap();
        let after = g.emit("after");
        let s = g.sequence([p, after]);
        assert_eq!(g.matches_prefix(p, &["right/x", "left/a", "after"]), Ok(2));
        assert!(g.check(s, &["right/x", "left/a", "after"]).is_ok());
    }

    #[test]
    fn product_reports_channel_failure_and_blocking_token() {
        let mut g = Grammar::new();
        let ab = pair(&mut g, "a", "b");
        let x = g.emit("x");
        let p = g.product([("left", ab), ("right", x)]).unwrap();
        match g.check(p, &["left/a", "right/x", "oops"]).unwrap_err() {
            Mismatch::Product {
                split,
                channels,
                blocked,
            } => {
                assert_eq!(split, 2);
                assert_eq!(channels.len(), 1);
                assert_eq!(channels[0].channel, "left");
                assert_eq!(blocked.unwrap().token, "oops");
            }
            other => panic!("unexpected mismatch {other:?}"),
        }
    }

    #[test]
    fn product_rejects_unknown_channel() {
        let mut g = Grammar::new();
        let a = g.emit("a");
        let p = g.product([("left", a)]).unwrap();
        let mismatch = g.check(p, &["middle/a"]).unwrap_err();
        assert!(mismatch.to_string().contains("`middle/a`"));
    }

    #[test]
    fn nested_products_split_on_first_segment() {
        let mut g = Grammar::new();
        let a = g.emit("a");
        let inner = g.product([("x", a), ("y", a)]).unwrap();
        let outer = g.product([("left", inner), ("right", a)]).unwrap();
        assert!(g
            .check(outer, &["left/y/a", "right/a", "left/x/a"])
            .is_ok());
    }

    #[test]
    fn memoization_does_not_change_results() {
        let mut g = Grammar::new();
        let ab = pair(&mut g, "a", "b");
        let p = g.product([("left", ab), ("right", ab)]).unwrap();
        let plain = MatchConfig { memoize: false };
        for transcript in [
            vec!["left/a", "right/a", "right/b", "left/b"],
            vec!["left/a", "right/b"],
        ] {
            assert_eq!(
                g.check(p, &transcript),
                g.check_with(p, &transcript, &plain)
            );
        }
    }
}
