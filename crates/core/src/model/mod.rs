mod answer;
mod ids;
mod problem;
mod roster;

pub use answer::{ANSWER_PRECISION, Answer, AnswerError, answers_match, rounded_key};
pub use ids::{ParseIdError, ProblemId};
pub use problem::{Attempt, MIN_SOLVE_SECONDS, NewProblem, Problem, ProblemError};
pub use roster::{Roster, RosterError};
