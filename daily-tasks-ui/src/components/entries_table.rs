//! Entries Table
//!
//! Read-only list of a category's entries, newest first.

use leptos::*;

use daily_tasks::EntryList;

/// Shown when a category has no entries yet
pub const EMPTY_MESSAGE: &str = "No entries yet. Submit your first entry above!";

#[component]
pub fn EntriesTable(entries: RwSignal<EntryList>) -> impl IntoView {
    move || {
        let list = entries.get();
        if list.is_empty() {
            return view! {
                <p class="text-center text-gray-500 py-8">{EMPTY_MESSAGE}</p>
            }.into_view();
        }

        view! {
            <div class="overflow-x-auto">
                <table class="min-w-full divide-y divide-gray-200">
                    <thead class="bg-gray-50">
                        <tr>
                            <th class="px-4 py-3 text-left text-xs font-medium text-gray-500 uppercase">"Date"</th>
                            <th class="px-4 py-3 text-left text-xs font-medium text-gray-500 uppercase">"Referral Link"</th>
                            <th class="px-4 py-3 text-left text-xs font-medium text-gray-500 uppercase">"Comment"</th>
                        </tr>
                    </thead>
                    <tbody class="bg-white divide-y divide-gray-200">
                        {list.iter().map(|entry| {
                            let link = entry.referral_link.clone();
                            view! {
                                <tr>
                                    <td class="px-4 py-3 whitespace-nowrap text-sm text-gray-900">
                                        {entry.date.format("%m/%d/%Y").to_string()}
                                    </td>
                                    <td class="px-4 py-3 text-sm">
                                        <a
                                            href=link.clone()
                                            target="_blank"
                                            rel="noopener noreferrer"
                                            class="text-blue-600 hover:underline break-all"
                                        >
                                            {link}
                                        </a>
                                    </td>
                                    <td class="px-4 py-3 text-sm text-gray-700 max-w-xs truncate" title=entry.comment.clone()>
                                        {entry.comment.clone()}
                                    </td>
                                </tr>
                            }
                        }).collect_view()}
                    </tbody>
                </table>
            </div>
        }.into_view()
    }
}
