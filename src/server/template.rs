// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use maud::DOCTYPE;
use maud::Markup;
use maud::html;

use crate::db::StoredPlan;
use crate::types::plan::DayKind;

const STYLE: &str = "
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; color: #222; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: 0.4rem; text-align: left; }
tr.rest { color: #999; }
tr.review { background: #f4f8ff; }
.high { font-weight: bold; }
";

pub fn page_template(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (STYLE) }
            }
            body {
                (body)
            }
        }
    }
}

fn day_class(kind: DayKind) -> &'static str {
    match kind {
        DayKind::Study => "study",
        DayKind::Review => "review",
        DayKind::Rest => "rest",
    }
}

pub fn plan_page(stored: &StoredPlan) -> Markup {
    let plan = &stored.plan;
    let body = html! {
        h1 { "Revision plan" }
        p {
            "Exam on " (plan.exam_date) ". This plan covers " (plan.horizon_days) " days."
        }
        @if !plan.summary.is_empty() {
            p.summary { (plan.summary) }
        }
        table {
            thead {
                tr {
                    th { "Day" }
                    th { "Date" }
                    th { "Topics" }
                    th { "Minutes" }
                    th { "Focus" }
                }
            }
            tbody {
                @for day in &plan.days {
                    tr class=(day_class(day.kind)) {
                        td { (day.day) }
                        td { (day.date) }
                        td {
                            @if day.kind == DayKind::Rest {
                                "Rest"
                            } @else {
                                @for (i, allocation) in day.allocations.iter().enumerate() {
                                    @if i > 0 { ", " }
                                    span class=(allocation.focus.as_str()) {
                                        (allocation.topic) " (" (allocation.minutes) "m)"
                                    }
                                }
                            }
                        }
                        td { (day.duration_minutes) }
                        td { (day.focus.as_str()) }
                    }
                }
            }
        }
    };
    page_template("Revision plan", body)
}
