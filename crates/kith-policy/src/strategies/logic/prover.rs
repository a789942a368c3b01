//! Tabled backward chaining with unification
//!
//! Every distinct call (a predicate applied to constants and variables, the
//! variables numbered by first appearance) owns one table per proof. A table
//! is filled once, from the ground facts and from every clause whose head
//! unifies with the call; callers subscribe to it and receive each answer
//! exactly once, including answers found after they subscribed. Recursive
//! rules such as graph connectivity therefore terminate on cyclic data, left
//! recursion included, and each `connected(a, b)` is solved at most once.
//!
//! Work runs off an explicit queue, so long derivations never deepen the
//! call stack. Each queued task costs one step; a proof that runs past its
//! budget is abandoned with an error. Answers must be ground.

use crate::error::EvaluationError;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A variable or a constant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Term {
    Var(String),
    Const(String),
}

/// `predicate(args...)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Atom {
    pub(crate) predicate: String,
    pub(crate) args: Vec<Term>,
}

impl Atom {
    pub(crate) fn ground(predicate: &str, args: &[&str]) -> Self {
        Self {
            predicate: predicate.to_string(),
            args: args.iter().map(|a| Term::Const((*a).to_string())).collect(),
        }
    }

    fn key(&self) -> (String, usize) {
        (self.predicate.clone(), self.args.len())
    }

    /// This atom under `bindings`, free variables renamed `@0`, `@1`, ...
    /// in order of appearance. Two calls share a table exactly when their
    /// patterns are equal.
    fn call_pattern(&self, bindings: &Bindings) -> Atom {
        let mut seen: Vec<&str> = Vec::new();
        let args = self
            .args
            .iter()
            .map(|arg| match walk(arg, bindings) {
                Term::Var(name) => {
                    let index = match seen.iter().position(|s| *s == name.as_str()) {
                        Some(index) => index,
                        None => {
                            seen.push(name);
                            seen.len() - 1
                        }
                    };
                    Term::Var(format!("@{index}"))
                }
                constant => constant.clone(),
            })
            .collect();
        Atom {
            predicate: self.predicate.clone(),
            args,
        }
    }
}

/// A body condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Literal {
    Call(Atom),
    Unify(Term, Term),
}

/// `head if body`; an empty body is an unconditional clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Clause {
    pub(crate) head: Atom,
    pub(crate) body: Vec<Literal>,
}

/// Clauses indexed by predicate and arity, in source order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Program {
    clauses: BTreeMap<(String, usize), Vec<Clause>>,
}

impl Program {
    pub(crate) fn new(clauses: Vec<Clause>) -> Self {
        let mut indexed: BTreeMap<(String, usize), Vec<Clause>> = BTreeMap::new();
        for clause in clauses {
            indexed.entry(clause.head.key()).or_default().push(clause);
        }
        Self { clauses: indexed }
    }

    pub(crate) fn defines(&self, predicate: &str, arity: usize) -> bool {
        self.clauses.contains_key(&(predicate.to_string(), arity))
    }

    pub(crate) fn clause_count(&self) -> usize {
        self.clauses.values().map(Vec::len).sum()
    }

    fn clauses(&self, key: &(String, usize)) -> &[Clause] {
        self.clauses.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
struct Relation {
    rows: Vec<Vec<String>>,
    /// Row positions keyed by column and value.
    by_column: BTreeMap<(usize, String), Vec<usize>>,
}

/// Ground facts for one evaluation, indexed by predicate, arity and column.
#[derive(Debug, Clone, Default)]
pub(crate) struct FactBase {
    relations: BTreeMap<(String, usize), Relation>,
    count: usize,
}

impl FactBase {
    pub(crate) fn insert(&mut self, predicate: &str, args: &[&str]) {
        let relation = self
            .relations
            .entry((predicate.to_string(), args.len()))
            .or_default();
        let row = relation.rows.len();
        for (column, value) in args.iter().enumerate() {
            relation
                .by_column
                .entry((column, (*value).to_string()))
                .or_default()
                .push(row);
        }
        relation
            .rows
            .push(args.iter().map(|value| (*value).to_string()).collect());
        self.count += 1;
    }

    pub(crate) fn fact_count(&self) -> usize {
        self.count
    }

    /// Rows that can match `pattern`, narrowed by its first constant.
    fn candidates(&self, pattern: &Atom) -> Vec<&[String]> {
        let Some(relation) = self.relations.get(&pattern.key()) else {
            return Vec::new();
        };
        let first_constant = pattern
            .args
            .iter()
            .enumerate()
            .find_map(|(column, arg)| match arg {
                Term::Const(value) => Some((column, value.clone())),
                Term::Var(_) => None,
            });
        match first_constant {
            Some(key) => relation
                .by_column
                .get(&key)
                .into_iter()
                .flatten()
                .filter_map(|&row| relation.rows.get(row).map(Vec::as_slice))
                .collect(),
            None => relation.rows.iter().map(Vec::as_slice).collect(),
        }
    }
}

type Bindings = BTreeMap<String, Term>;

type Answer = Vec<String>;

fn walk<'a>(term: &'a Term, bindings: &'a Bindings) -> &'a Term {
    let mut current = term;
    while let Term::Var(name) = current {
        match bindings.get(name) {
            Some(bound) => current = bound,
            None => break,
        }
    }
    current
}

fn bind(left: &Term, right: &Term, bindings: &mut Bindings) -> Option<()> {
    let left = walk(left, bindings).clone();
    let right = walk(right, bindings).clone();
    match (left, right) {
        (l, r) if l == r => Some(()),
        (Term::Var(name), other) | (other, Term::Var(name)) => {
            bindings.insert(name, other);
            Some(())
        }
        _ => None,
    }
}

fn bind_answer(args: &[Term], answer: &[String], bindings: &mut Bindings) -> Option<()> {
    for (arg, value) in args.iter().zip(answer) {
        bind(arg, &Term::Const(value.clone()), bindings)?;
    }
    Some(())
}

fn ground_args(pattern: &Atom, bindings: &Bindings) -> Result<Answer, EvaluationError> {
    pattern
        .args
        .iter()
        .map(|arg| match walk(arg, bindings) {
            Term::Const(value) => Ok(value.clone()),
            Term::Var(_) => Err(EvaluationError::engine(format!(
                "`{}/{}` derived an answer with an unbound argument",
                pattern.predicate,
                pattern.args.len()
            ))),
        })
        .collect()
}

/// Answers found so far for one call pattern, and the frames waiting on them.
struct Table<'p> {
    pattern: Atom,
    answers: Vec<Answer>,
    seen: BTreeSet<Answer>,
    consumers: Vec<Frame<'p>>,
}

/// One clause instance working towards an answer for `table`.
#[derive(Clone)]
struct Frame<'p> {
    clause: &'p Clause,
    position: usize,
    bindings: Bindings,
    table: usize,
}

enum Task<'p> {
    Fill(usize),
    Resume(Frame<'p>),
    Deliver(Frame<'p>, Answer),
}

struct Solver<'p> {
    program: &'p Program,
    facts: &'p FactBase,
    tables: Vec<Table<'p>>,
    by_pattern: BTreeMap<Atom, usize>,
    queue: VecDeque<Task<'p>>,
    steps: u64,
    budget: u64,
}

impl<'p> Solver<'p> {
    fn table(&mut self, pattern: Atom) -> usize {
        if let Some(&id) = self.by_pattern.get(&pattern) {
            return id;
        }
        let id = self.tables.len();
        self.by_pattern.insert(pattern.clone(), id);
        self.tables.push(Table {
            pattern,
            answers: Vec::new(),
            seen: BTreeSet::new(),
            consumers: Vec::new(),
        });
        self.queue.push_back(Task::Fill(id));
        id
    }

    fn run(&mut self, root: usize) -> Result<bool, EvaluationError> {
        while let Some(task) = self.queue.pop_front() {
            self.steps += 1;
            if self.steps > self.budget {
                return Err(EvaluationError::StepLimit { limit: self.budget });
            }
            match task {
                Task::Fill(id) => self.fill(id),
                Task::Resume(frame) => self.resume(frame)?,
                Task::Deliver(mut frame, answer) => {
                    let clause = frame.clause;
                    let Some(Literal::Call(atom)) = clause.body.get(frame.position) else {
                        continue;
                    };
                    if bind_answer(&atom.args, &answer, &mut frame.bindings).is_some() {
                        frame.position += 1;
                        self.resume(frame)?;
                    }
                }
            }
            if !self.tables[root].answers.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn fill(&mut self, id: usize) {
        let (program, facts) = (self.program, self.facts);
        let pattern = self.tables[id].pattern.clone();

        for row in facts.candidates(&pattern) {
            let mut bindings = Bindings::new();
            if bind_answer(&pattern.args, row, &mut bindings).is_some() {
                self.answer(id, row.to_vec());
            }
        }

        for clause in program.clauses(&pattern.key()) {
            let mut bindings = Bindings::new();
            let unified = clause
                .head
                .args
                .iter()
                .zip(&pattern.args)
                .all(|(head, call)| bind(head, call, &mut bindings).is_some());
            if unified {
                self.queue.push_back(Task::Resume(Frame {
                    clause,
                    position: 0,
                    bindings,
                    table: id,
                }));
            }
        }
    }

    /// Run a frame until it answers, fails, or waits on a call.
    fn resume(&mut self, mut frame: Frame<'p>) -> Result<(), EvaluationError> {
        let clause = frame.clause;
        loop {
            match clause.body.get(frame.position) {
                None => {
                    let answer = ground_args(&self.tables[frame.table].pattern, &frame.bindings)?;
                    self.answer(frame.table, answer);
                    return Ok(());
                }
                Some(Literal::Unify(left, right)) => {
                    if bind(left, right, &mut frame.bindings).is_none() {
                        return Ok(());
                    }
                    frame.position += 1;
                }
                Some(Literal::Call(atom)) => {
                    let callee = self.table(atom.call_pattern(&frame.bindings));
                    for answer in &self.tables[callee].answers {
                        self.queue
                            .push_back(Task::Deliver(frame.clone(), answer.clone()));
                    }
                    self.tables[callee].consumers.push(frame);
                    return Ok(());
                }
            }
        }
    }

    fn answer(&mut self, id: usize, answer: Answer) {
        let table = &mut self.tables[id];
        if !table.seen.insert(answer.clone()) {
            return;
        }
        for consumer in &table.consumers {
            self.queue
                .push_back(Task::Deliver(consumer.clone(), answer.clone()));
        }
        table.answers.push(answer);
    }
}

/// Whether `goal` is provable from `program` and `facts` within `budget` steps.
pub(crate) fn prove(
    program: &Program,
    facts: &FactBase,
    goal: Atom,
    budget: u64,
) -> Result<bool, EvaluationError> {
    let mut solver = Solver {
        program,
        facts,
        tables: Vec::new(),
        by_pattern: BTreeMap::new(),
        queue: VecDeque::new(),
        steps: 0,
        budget,
    };
    let root = solver.table(goal.call_pattern(&Bindings::new()));
    let proved = solver.run(root)?;
    tracing::trace!(
        tables = solver.tables.len(),
        steps = solver.steps,
        proved,
        "logic proof finished"
    );
    Ok(proved)
}
