//! Trade execution checklist. A trade is permitted only when every item of the checklist holds;
//! otherwise the unmet items are reported.

pub mod args;
pub mod rules;

use std::fmt::Write;

use ansi_term::Colour;
use anyhow::Result;
use args::ChecklistArgs;
use rules::{RiskPlan, TradeChecklist, Verdict};
use tracing::info;

impl TryFrom<&ChecklistArgs> for TradeChecklist {
    type Error = rules::ChecklistError;

    fn try_from(args: &ChecklistArgs) -> Result<Self, Self::Error> {
        Ok(TradeChecklist {
            trend: args.trend,
            news_checked: args.news,
            poi_reached: args.poi,
            choch_confirmed: args.choch,
            imbalance_present: args.imbalance,
            divergence_confirmed: args.divergence,
            risk: RiskPlan::new(args.risk, args.reward_ratio)?,
        })
    }
}

/// Evaluates the checklist described by `args` and prints the verdict.
pub fn run_checklist(args: &ChecklistArgs) -> Result<Verdict> {
    let checklist = TradeChecklist::try_from(args)?;
    let verdict = checklist.evaluate();
    info!("Checklist {checklist:?} evaluated to {verdict:?}");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print!("{}", render_verdict(&verdict));
    }
    Ok(verdict)
}

pub fn render_verdict(verdict: &Verdict) -> String {
    let mut output = String::new();
    match verdict {
        Verdict::Permitted {
            risk_pct,
            reward_pct,
        } => {
            let _ = writeln!(
                output,
                "{}",
                Colour::Green.paint("ALL CRITERIA MET. You have permission to trade.")
            );
            let _ = writeln!(output, "Summary: Risking {risk_pct}% to gain {reward_pct}%");
        }
        Verdict::Denied { missing } => {
            let _ = writeln!(
                output,
                "{}",
                Colour::Yellow.paint(
                    "CRITERIA NOT MET. Step away from the terminal. Do not click 'Buy' or 'Sell'."
                )
            );
            let _ = writeln!(output, "Missing requirements:");
            for requirement in missing {
                let _ = writeln!(output, "- {}", requirement.advice());
            }
        }
    }
    output
}
