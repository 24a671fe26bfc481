// Copyright 2024 FastLabs Developers
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

use weekendlog::RotatingLogWriter;
use weekendlog::bridge::WeekendLog;
use weekendlog::non_blocking::NonBlockingBuilder;

fn main() {
    let writer = RotatingLogWriter::builder("logs").build().unwrap();
    let (non_blocking, _guard) = NonBlockingBuilder::new("weekendlog", writer)
        .build()
        .unwrap();

    weekendlog::bridge::setup_log_crate(WeekendLog::new(non_blocking));

    let repeat = 1;

    for i in 0..repeat {
        log::error!("Hello error!");
        log::warn!("Hello warn!");
        log::info!("Hello info!");
        log::debug!("Hello debug!");
        log::trace!("Hello trace!");

        if i + 1 < repeat {
            std::thread::sleep(std::time::Duration::from_secs(10));
        }
    }
}
